use std::fmt::Display;
use std::time::Duration;

use chromalign_core::align::SearchWindow;
use chromalign_core::frame::{AlignmentResult, EstimateOrigin, Pair};
use chromalign_core::pipeline::config::AlignConfig;
use chromalign_core::pipeline::AlignmentReport;
use console::Style;

use crate::commands::format_hint;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    warning: Style,
    path: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            warning: Style::new().yellow().bold(),
            path: Style::new().underlined(),
        }
    }
}

fn rule(len: usize) -> String {
    "\u{2550}".repeat(len)
}

pub fn print_align_summary(config: &AlignConfig) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("Chromalign"));
    println!("  {}", s.title.apply_to(rule(10)));
    println!();

    for (label, path) in ["Red", "Green", "Blue"].iter().zip(config.inputs.iter()) {
        println!(
            "  {:<14}{}",
            s.label.apply_to(label),
            s.path.apply_to(path.display())
        );
    }
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Workers"),
        s.value.apply_to(config.worker_budget())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Channel"),
        s.method.apply_to(config.channel)
    );
    println!();

    // Search window
    let search = &config.search;
    println!("  {}", s.header.apply_to("Search"));
    let center = match (search.center_x, search.center_y) {
        (Some(x), Some(y)) => format!("({x}, {y})"),
        (Some(x), None) => format!("({x}, middle)"),
        (None, Some(y)) => format!("(middle, {y})"),
        (None, None) => "middle of plate #0".to_string(),
    };
    println!("    {:<12}{}", s.label.apply_to("Center"), s.value.apply_to(center));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Range"),
        s.value.apply_to(format!("\u{b1}{} x \u{b1}{} px", search.range_x, search.range_y))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Block"),
        s.value.apply_to(format!("{} x {} px", search.size_x * 2, search.size_y * 2))
    );
    println!();

    // Hints
    println!("  {}", s.header.apply_to("Hints"));
    for pair in Pair::ALL {
        match config.hints.get(pair) {
            Some(hint) => println!(
                "    {:<12}{}",
                s.label.apply_to(pair),
                s.value.apply_to(format_hint(&hint))
            ),
            None => println!(
                "    {:<12}{}",
                s.label.apply_to(pair),
                s.disabled.apply_to("search")
            ),
        }
    }
    println!();

    // Output
    println!("  {}", s.header.apply_to("Output"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Depth"),
        s.value.apply_to(config.transform.bit_depth)
    );
    if config.transform.shift == 0 {
        println!("    {:<12}{}", s.label.apply_to("Shift"), s.disabled.apply_to("none"));
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Shift"),
            s.value.apply_to(config.transform.shift)
        );
    }
    println!();
}

pub fn print_report(report: &AlignmentReport, config: &AlignConfig, elapsed: Duration) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Pairwise offsets"));
    for estimate in report.triangle.iter() {
        let marker = if estimate.pair == report.registration.anchor {
            s.method.apply_to(" anchor").to_string()
        } else {
            String::new()
        };
        let origin = match estimate.origin {
            EstimateOrigin::Searched => s.label.apply_to(estimate.origin),
            EstimateOrigin::Hinted => s.disabled.apply_to(estimate.origin),
        };
        println!(
            "    {:<12}{} dist {:.3} ({}){}",
            s.label.apply_to(estimate.pair),
            s.value.apply_to(estimate.result.offset),
            estimate.result.distance,
            origin,
            marker
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Registration"));
    for (k, offset) in report.registration.offsets.iter().enumerate() {
        println!(
            "    {:<12}{}",
            s.label.apply_to(format!("#{k}")),
            s.value.apply_to(offset)
        );
    }
    println!(
        "    {:<12}{}",
        s.label.apply_to("Canvas"),
        s.value.apply_to(format!(
            "{} x {}",
            report.registration.canvas_width, report.registration.canvas_height
        ))
    );
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mean"),
        s.value.apply_to(format!("{:.2}", report.mean_intensity))
    );
    println!();

    print_warnings(&s, report.warnings.as_slice());

    println!(
        "  {} written in {:.2?}",
        s.path.apply_to(config.output.display()),
        elapsed
    );
}

pub fn print_search_result(result: &AlignmentResult, window: &SearchWindow, elapsed: Duration) {
    let s = Styles::new();

    println!();
    println!(
        "  {:<14}({}, {})",
        s.label.apply_to("Center"),
        window.center_x,
        window.center_y
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Offset"),
        s.value.apply_to(result.offset)
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Distance"),
        s.value.apply_to(format!("{:.3}", result.distance))
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Hint"),
        s.method.apply_to(format_hint(result))
    );
    println!("  {:<14}{:.2?}", s.label.apply_to("Time"), elapsed);
    println!();
}

pub fn print_edge_warnings<W: Display>(warnings: &[W]) {
    print_warnings(&Styles::new(), warnings);
}

fn print_warnings<W: Display>(s: &Styles, warnings: &[W]) {
    if warnings.is_empty() {
        return;
    }
    println!("  {}", s.warning.apply_to("Warnings"));
    for warning in warnings {
        println!("    {}", s.warning.apply_to(warning));
    }
    println!();
}
