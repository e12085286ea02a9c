use std::io::Write;
use std::sync::Arc;

/// Callback type for reporting stage progress.
/// Arguments: label, fraction done in `[0.0, 1.0]`
pub type ProgressFn = Arc<dyn Fn(&str, f64) + Send + Sync>;

/// Width of the bar between the brackets, in characters.
pub const BAR_WIDTH: usize = 50;

const LABEL_WIDTH: usize = 16;

/// Render one progress line.
///
/// The line starts with a carriage return so consecutive renderings overwrite
/// each other, and ends with a newline only once `fraction` reaches 1.0.
pub fn render_progress(label: &str, fraction: f64) -> String {
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let percent = (100.0 * fraction) as u32;
    let filled = ((BAR_WIDTH as f64) * fraction) as usize;

    let mut line = format!(
        "\r{:<width$}: {:>3}%[{}{}]",
        label,
        percent,
        "=".repeat(filled),
        " ".repeat(BAR_WIDTH - filled),
        width = LABEL_WIDTH
    );
    if fraction >= 1.0 {
        line.push('\n');
    }
    line
}

/// Draw the progress line on stdout, redrawing in place.
pub fn report_progress(label: &str, fraction: f64) {
    let mut stdout = std::io::stdout().lock();
    // Console feedback only; a closed stdout must not fail the stage.
    let _ = stdout.write_all(render_progress(label, fraction).as_bytes());
    let _ = stdout.flush();
}

/// Returns the default progress function that draws a bar on stdout.
pub fn default_progress_fn() -> ProgressFn {
    Arc::new(|label: &str, fraction: f64| report_progress(label, fraction))
}
