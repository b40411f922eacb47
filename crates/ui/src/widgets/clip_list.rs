use engine::{ClipId, ClipSummary, format_clock};
use iced::widget::{Column, button, column, row, scrollable, text};
use iced::{Alignment, Element, Length};

/// Range line shown under each clip label.
pub fn clip_caption(clip: &ClipSummary) -> String {
    format!(
        "{} - {} ({:.1}s)",
        format_clock(clip.start_time),
        format_clock(clip.end_time),
        clip.duration
    )
}

/// Button labels paired with the link each one copies to the clipboard.
pub fn copy_actions(clip: &ClipSummary) -> [(&'static str, String); 2] {
    [
        ("Copy watch link", clip.watch_link.clone()),
        ("Copy embed link", clip.embed_link.clone()),
    ]
}

/// Renders committed clips in creation order with Play, Delete and link actions.
pub fn view<'a, Message>(
    clips: &'a [ClipSummary],
    playing_clip: Option<ClipId>,
    on_play: fn(ClipId) -> Message,
    on_delete: fn(ClipId) -> Message,
    on_copy_link: fn(String) -> Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    if clips.is_empty() {
        return text("No clips yet. Set a start and end time to create one.").into();
    }

    let rows = clips.iter().map(|clip| -> Element<'a, Message> {
        let title = if playing_clip == Some(clip.id) {
            format!("{} (playing)", clip.label)
        } else {
            clip.label.clone()
        };

        let copy_buttons = copy_actions(clip)
            .into_iter()
            .map(|(label, link)| -> Element<'a, Message> {
                button(label).on_press(on_copy_link(link)).into()
            });

        row![
            column![text(title), text(clip_caption(clip)).size(13)]
                .spacing(2)
                .width(Length::Fill),
            button("Play").on_press(on_play(clip.id)),
            button("Delete").on_press(on_delete(clip.id)),
        ]
        .extend(copy_buttons)
        .spacing(8)
        .align_y(Alignment::Center)
        .into()
    });

    scrollable(Column::with_children(rows).spacing(8))
        .height(Length::Fill)
        .into()
}
