//! Status lines on stderr.

use console::style;

/// Apply `--no-color` to console styling and to miette's report renderer.
pub fn init_colors(no_color: bool) {
    let colors = !no_color && crate::logger::should_use_colors();
    console::set_colors_enabled(colors);
    console::set_colors_enabled_stderr(colors);
    // Fails only when a hook is already installed; keep that one.
    let _ = miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .color(colors)
                .context_lines(2)
                .build(),
        )
    }));
}

pub fn success(message: &str) {
    eprintln!("{} {}", style("✓").green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", style("ℹ").blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// `1 route`, `3 routes`.
pub fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
