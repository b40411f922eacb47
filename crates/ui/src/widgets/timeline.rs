use engine::{ClipSummary, PlaybackPosition, TimelineSnapshot};
use iced::widget::canvas::{self, Path, Stroke};
use iced::widget::container;
use iced::{Color, Element, Length, Point, Rectangle, Size, Theme, mouse};

/// Converts an x coordinate in widget space to a position in seconds.
///
/// The left edge maps to `0` and the right edge to `duration`. Positions
/// outside the widget are clamped.
pub fn seconds_from_x(x: f32, width: f32, duration: f64) -> f64 {
    if duration <= 0.0 || width <= 0.0 {
        return 0.0;
    }

    let ratio = f64::from(x.clamp(0.0, width) / width);
    (ratio * duration).clamp(0.0, duration)
}

fn x_from_seconds(seconds: f64, duration: f64, width: f32) -> f32 {
    if duration <= 0.0 {
        return 0.0;
    }
    ((seconds.clamp(0.0, duration) / duration) as f32) * width
}

#[derive(Debug, Default)]
struct TimelineState {
    dragging: bool,
}

#[derive(Debug)]
struct TimelineProgram<'a, Message> {
    position: PlaybackPosition,
    pending_start: Option<f64>,
    clips: &'a [ClipSummary],
    playing_clip: Option<u64>,
    cache: &'a canvas::Cache,
    on_scrub: fn(f64) -> Message,
}

impl<Message> canvas::Program<Message> for TimelineProgram<'_, Message> {
    type State = TimelineState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        let duration = self.position.duration;
        if duration <= 0.0 {
            return (canvas::event::Status::Ignored, None);
        }

        let cursor_x = cursor.position().map(|position| position.x - bounds.x);
        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let Some(x) = cursor_x.filter(|_| cursor.is_over(bounds)) else {
                    return (canvas::event::Status::Ignored, None);
                };
                state.dragging = true;
                let seconds = seconds_from_x(x, bounds.width, duration);
                (canvas::event::Status::Captured, Some((self.on_scrub)(seconds)))
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if std::mem::take(&mut state.dragging) {
                    (canvas::event::Status::Captured, None)
                } else {
                    (canvas::event::Status::Ignored, None)
                }
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) if state.dragging => {
                let Some(x) = cursor_x else {
                    return (canvas::event::Status::Ignored, None);
                };
                let seconds = seconds_from_x(x, bounds.width, duration);
                (canvas::event::Status::Captured, Some((self.on_scrub)(seconds)))
            }
            _ => (canvas::event::Status::Ignored, None),
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let duration = self.position.duration;
        let clips = self.cache.draw(renderer, bounds.size(), |frame| {
            let background = Path::rectangle(Point::ORIGIN, frame.size());
            frame.fill(&background, Color::from_rgb8(22, 24, 29));

            if duration <= 0.0 {
                return;
            }

            for clip in self.clips {
                let x = x_from_seconds(clip.start_time, duration, bounds.width);
                let end = x_from_seconds(clip.end_time, duration, bounds.width);
                let rect = Path::rectangle(
                    Point::new(x, 8.0),
                    Size::new((end - x).max(1.0), (bounds.height - 16.0).max(1.0)),
                );
                let color = if self.playing_clip == Some(clip.id) {
                    Color::from_rgb8(92, 156, 236)
                } else {
                    Color::from_rgb8(55, 110, 188)
                };
                frame.fill(&rect, color);
            }
        });

        let mut markers = canvas::Frame::new(renderer, bounds.size());
        if duration > 0.0 {
            if let Some(start) = self.pending_start {
                let start_x = x_from_seconds(start, duration, bounds.width);
                let start_line = Path::line(
                    Point::new(start_x, 3.0),
                    Point::new(start_x, (bounds.height - 3.0).max(3.0)),
                );
                markers.stroke(
                    &start_line,
                    Stroke::default()
                        .with_width(2.0)
                        .with_color(Color::from_rgb8(122, 214, 110)),
                );
            }

            let x = self.position.fraction() as f32 * bounds.width;
            let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
            markers.stroke(
                &line,
                Stroke::default()
                    .with_width(2.0)
                    .with_color(Color::from_rgb8(255, 94, 77)),
            );
        }

        vec![clips, markers.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.position.duration > 0.0 && cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::None
        }
    }
}

/// Renders the clip strip with the pending start marker and playhead.
///
/// `cache` holds the clip layer; clear it whenever the snapshot or the
/// duration changes.
pub fn view<'a, Message>(
    snapshot: &'a TimelineSnapshot,
    position: PlaybackPosition,
    playing_clip: Option<u64>,
    cache: &'a canvas::Cache,
    on_scrub: fn(f64) -> Message,
) -> Element<'a, Message>
where
    Message: 'a,
{
    container(
        canvas::Canvas::new(TimelineProgram {
            position,
            pending_start: snapshot.pending_start,
            clips: snapshot.clips.as_slice(),
            playing_clip,
            cache,
            on_scrub,
        })
        .width(Length::Fill)
        .height(Length::Fixed(48.0)),
    )
    .width(Length::Fill)
    .into()
}

#[cfg(test)]
mod tests {
    use engine::PlaybackPosition;
    use iced::widget::canvas::{self, Program};
    use iced::{Point, Rectangle, mouse};

    use super::{TimelineProgram, TimelineState};
    use super::{seconds_from_x, x_from_seconds};

    fn bounds() -> Rectangle {
        Rectangle {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
        }
    }

    fn program(cache: &canvas::Cache, duration: f64) -> TimelineProgram<'_, f64> {
        TimelineProgram {
            position: PlaybackPosition {
                current_time: 0.0,
                duration,
            },
            pending_start: None,
            clips: &[],
            playing_clip: None,
            cache,
            on_scrub: |seconds| seconds,
        }
    }

    #[test]
    fn maps_edges_to_start_and_duration() {
        assert_eq!(seconds_from_x(0.0, 200.0, 120.0), 0.0);
        assert_eq!(seconds_from_x(200.0, 200.0, 120.0), 120.0);
    }

    #[test]
    fn clamps_positions_outside_the_widget() {
        assert_eq!(seconds_from_x(-10.0, 200.0, 120.0), 0.0);
        assert_eq!(seconds_from_x(250.0, 200.0, 120.0), 120.0);
    }

    #[test]
    fn maps_middle_position_proportionally() {
        assert_eq!(seconds_from_x(50.0, 200.0, 120.0), 30.0);
    }

    #[test]
    fn unknown_duration_maps_to_zero() {
        assert_eq!(seconds_from_x(100.0, 200.0, 0.0), 0.0);
        assert_eq!(x_from_seconds(10.0, 0.0, 200.0), 0.0);
    }

    #[test]
    fn playhead_x_uses_same_scale_as_scrub_mapping() {
        assert_eq!(x_from_seconds(30.0, 120.0, 200.0), 50.0);
        assert_eq!(x_from_seconds(500.0, 120.0, 200.0), 200.0);
    }

    #[test]
    fn left_click_scrubs_to_cursor_position() {
        let cache = canvas::Cache::new();
        let program = program(&cache, 60.0);
        let mut state = TimelineState::default();

        let (_, message) = program.update(
            &mut state,
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)),
            bounds(),
            mouse::Cursor::Available(Point::new(25.0, 10.0)),
        );

        assert_eq!(message, Some(15.0));
        assert!(state.dragging);
    }

    #[test]
    fn mouse_interaction_is_none_before_duration_is_known() {
        let cache = canvas::Cache::new();
        let interaction = program(&cache, 0.0).mouse_interaction(
            &TimelineState::default(),
            bounds(),
            mouse::Cursor::Available(Point::new(20.0, 10.0)),
        );

        assert_eq!(interaction, mouse::Interaction::None);
    }

    #[test]
    fn mouse_interaction_is_pointer_when_duration_is_known() {
        let cache = canvas::Cache::new();
        let interaction = program(&cache, 10.0).mouse_interaction(
            &TimelineState::default(),
            bounds(),
            mouse::Cursor::Available(Point::new(20.0, 10.0)),
        );

        assert_eq!(interaction, mouse::Interaction::Pointer);
    }
}
