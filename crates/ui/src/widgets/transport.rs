use engine::{PlaybackPosition, format_clock};
use iced::widget::{button, row, slider, text};
use iced::{Alignment, Element, Length};

/// Text shown in the time display, `m:ss / m:ss`.
pub fn clock_label(position: PlaybackPosition) -> String {
    format!(
        "{} / {}",
        format_clock(position.current_time),
        format_clock(position.duration)
    )
}

/// Renders the play/pause toggle, scrub slider and time display.
///
/// Controls stay disabled until the player is ready.
pub fn view<'a, Message>(
    ready: bool,
    playing: bool,
    position: PlaybackPosition,
    on_toggle: Message,
    on_scrub: fn(f64) -> Message,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    let toggle_label = if playing { "Pause" } else { "Play" };
    let toggle = button(toggle_label)
        .width(Length::Fixed(72.0))
        .on_press_maybe(ready.then_some(on_toggle));

    let max = position.duration.max(0.0);
    let scrubber: Element<'a, Message> = if ready && max > 0.0 {
        slider(0.0..=max, position.current_time.clamp(0.0, max), on_scrub)
            .step(0.1)
            .into()
    } else {
        slider(0.0..=1.0, 0.0, on_scrub).into()
    };

    row![toggle, scrubber, text(clock_label(position))]
        .spacing(12)
        .align_y(Alignment::Center)
        .into()
}
