mod app;
mod log_buffer;
mod settings;
mod theme;
mod workers;

use app::App;

fn main() {
    env_logger::init();
    install_crash_reporter();

    let result = iced::application(App::new, App::update, App::view)
        .title("VoiceDesk")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(720.0, 560.0),
            ..Default::default()
        })
        .run();

    if let Err(e) = result {
        report_crash(&format!("startup failed: {e}"));
        std::process::exit(1);
    }
}

/// An unhandled panic on any thread is written to a crash file and
/// shown in a blocking alert before the process dies.
fn install_crash_reporter() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        report_crash(&info.to_string());
        default_hook(info);
    }));
}

fn report_crash(details: &str) {
    log::error!("{details}");
    let _ = std::fs::write("error_log.txt", details);
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("VoiceDesk")
        .set_description(format!(
            "An unexpected error occurred and was written to error_log.txt:\n\n{details}"
        ))
        .show();
}
