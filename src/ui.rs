use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::str::FromStr;
use std::time::{Duration, Instant};

/// Interval between status lines when no spinner is drawn.
const PLAIN_STATUS_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UiMode {
    #[default]
    Auto,
    Plain,
    Pretty,
}

impl FromStr for UiMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "auto" => Ok(UiMode::Auto),
            "plain" => Ok(UiMode::Plain),
            "pretty" => Ok(UiMode::Pretty),
            other => Err(format!(
                "unknown ui mode '{}'; expected auto, plain or pretty",
                other
            )),
        }
    }
}

/// Single live status line for the viewer.
///
/// On a terminal it is a spinner redrawn in place; otherwise the latest
/// status is written to stderr at most once per second.
pub struct StatusLine {
    title: String,
    start: Instant,
    spinner: Option<ProgressBar>,
    last_plain: Option<Instant>,
}

impl StatusLine {
    pub fn new(title: &str, mode: UiMode, is_tty: bool) -> Self {
        let use_pretty = is_tty
            && match mode {
                UiMode::Pretty | UiMode::Auto => true,
                UiMode::Plain => false,
            };

        let spinner = if use_pretty {
            let spinner = ProgressBar::new_spinner();
            spinner.set_draw_target(ProgressDrawTarget::stderr());
            spinner.enable_steady_tick(Duration::from_millis(120));
            let style = ProgressStyle::with_template("{spinner} {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            spinner.set_style(style);
            spinner.set_prefix(title.to_string());
            spinner.set_message("waiting for frames…");
            Some(spinner)
        } else {
            eprintln!("==> {}", title);
            None
        };

        Self {
            title: title.to_string(),
            start: Instant::now(),
            spinner,
            last_plain: None,
        }
    }

    pub fn update(&mut self, message: String) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(message);
            return;
        }
        let due = self
            .last_plain
            .map_or(true, |last| last.elapsed() >= PLAIN_STATUS_INTERVAL);
        if due {
            eprintln!("[{}] {}", self.title, message);
            self.last_plain = Some(Instant::now());
        }
    }

    /// Print a line without tearing the spinner.
    pub fn println(&self, line: &str) {
        match &self.spinner {
            Some(spinner) => spinner.println(line),
            None => eprintln!("{}", line),
        }
    }
}

impl Drop for StatusLine {
    fn drop(&mut self) {
        let message = format!(
            "✔ {} closed ({})",
            self.title,
            format_duration(self.start.elapsed())
        );
        if let Some(spinner) = &self.spinner {
            spinner.finish_with_message(message);
        } else {
            eprintln!("{message}");
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs() >= 60 {
        format!("{}m{:02}s", duration.as_secs() / 60, duration.as_secs() % 60)
    } else if duration.as_secs() >= 1 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}
