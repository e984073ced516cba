use ocean_core::notify::{Notifier, Toast};

/// Terminal stand-in for the browser: alerts and toasts go to stderr, the
/// redirect target to stdout.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    pub redirect: Option<String>,
}

impl Notifier for ConsoleNotifier {
    fn alert(&mut self, text: &str) {
        eprintln!("[alert] {text}");
    }

    fn toast(&mut self, toast: Toast) {
        eprintln!("[{}] {}", toast.heading, toast.text);
    }

    fn navigate(&mut self, url: &str) {
        println!("redirect: {url}");
        self.redirect = Some(url.to_string());
    }
}
