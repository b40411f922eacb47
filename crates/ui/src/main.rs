mod app;
mod bridge;
mod widgets;

use app::AppState;

fn main() -> iced::Result {
    init_tracing();

    iced::application(AppState::title, AppState::update, AppState::view)
        .subscription(AppState::subscription)
        .window_size((960.0, 640.0))
        .run_with(AppState::boot)
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();
}
