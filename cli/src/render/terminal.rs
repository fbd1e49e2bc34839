// Terminal Rendering
//
// Colored, human-oriented view of a plan report. Colors come from the
// `colored` crate and respect its global override (`--no-color`,
// `NO_COLOR`).

use std::fmt::{self, Display, Formatter};

use colored::{Color, Colorize};

use infrasync_kernel::{Change, ChangeKind, PlanReport, RiskLevel, Summary};

use super::{attribute_diff, attribute_listing, DiffLine};

const BANNER: &str = "═══════════════════════════════════════════════════════";
const RULE: &str = "────────────────────────────";

#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer {
    pub show_unchanged: bool,
    pub verbose: bool,
    pub compact: bool,
}

impl TerminalRenderer {
    pub fn render(&self, report: &PlanReport) -> String {
        TerminalView {
            options: *self,
            report,
        }
        .to_string()
    }
}

/// One-line `+N ~N ⟳N -N` overview.
pub fn compact_line(summary: &Summary) -> String {
    let parts: Vec<String> = [
        (summary.to_create(), "+", Color::Green),
        (summary.to_update(), "~", Color::Yellow),
        (summary.to_replace(), "⟳", Color::Magenta),
        (summary.to_delete(), "-", Color::Red),
        (summary.unrecognized(), "?", Color::BrightBlack),
    ]
    .into_iter()
    .filter(|(count, _, _)| *count > 0)
    .map(|(count, glyph, color)| format!("{glyph}{count}").color(color).to_string())
    .collect();

    if parts.is_empty() {
        "No changes".green().to_string()
    } else {
        parts.join(" ")
    }
}

struct Section {
    kind: ChangeKind,
    title: &'static str,
    icon: &'static str,
    marker: &'static str,
    color: Color,
}

const SECTIONS: [Section; 5] = [
    Section {
        kind: ChangeKind::Create,
        title: "CREATE",
        icon: "✓",
        marker: "+",
        color: Color::Green,
    },
    Section {
        kind: ChangeKind::Update,
        title: "UPDATE",
        icon: "~",
        marker: "~",
        color: Color::Yellow,
    },
    Section {
        kind: ChangeKind::Replace,
        title: "REPLACE",
        icon: "⟳",
        marker: "⟳",
        color: Color::Magenta,
    },
    Section {
        kind: ChangeKind::Delete,
        title: "DESTROY",
        icon: "✗",
        marker: "-",
        color: Color::Red,
    },
    Section {
        kind: ChangeKind::NoOp,
        title: "leave UNCHANGED",
        icon: "•",
        marker: "•",
        color: Color::White,
    },
];

struct TerminalView<'a> {
    options: TerminalRenderer,
    report: &'a PlanReport,
}

impl Display for TerminalView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;

        if self.options.compact {
            writeln!(f, "{}", compact_line(summary))?;
        } else {
            self.header(f, summary)?;
            self.overview(f, summary)?;

            if summary.changes().is_empty() {
                writeln!(
                    f,
                    "{}",
                    "✓ No changes detected. Infrastructure is up-to-date.".green()
                )?;
                return Ok(());
            }

            for section in &SECTIONS {
                if section.kind == ChangeKind::NoOp && !self.options.show_unchanged {
                    continue;
                }
                self.section(f, section, summary)?;
            }
            self.unrecognized(f, summary)?;
            writeln!(f)?;
        }

        self.warnings(f)?;
        self.destructive_banner(f, summary)
    }
}

impl TerminalView<'_> {
    fn header(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", BANNER.cyan())?;
        writeln!(f, "{}", "  Terraform Plan Summary".cyan())?;
        writeln!(f, "{}", BANNER.cyan())?;
        writeln!(f)?;
        writeln!(f, "Terraform Version: {}", summary.tool_version())?;
        writeln!(f, "Format Version: {}", summary.format_version())?;
        writeln!(f)
    }

    fn overview(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        writeln!(f, "{}", "Changes Overview:".cyan())?;
        writeln!(f, "{}", "─────────────────".cyan())?;

        let counters = [
            (summary.to_create(), "✓", "to create", Color::Green),
            (summary.to_update(), "~", "to update", Color::Yellow),
            (summary.to_replace(), "⟳", "to replace", Color::Magenta),
            (summary.to_delete(), "✗", "to destroy", Color::Red),
        ];
        for (count, icon, label, color) in counters {
            if count > 0 {
                writeln!(f, "{}", format!("  {icon} {count} {label}").color(color))?;
            }
        }

        if self.options.show_unchanged && summary.no_changes() > 0 {
            writeln!(f, "  • {} unchanged", summary.no_changes())?;
        }
        if summary.unrecognized() > 0 {
            writeln!(
                f,
                "{}",
                format!("  ? {} unrecognized", summary.unrecognized()).bright_black()
            )?;
        }

        if !summary.has_changes() && summary.no_changes() > 0 {
            writeln!(f)?;
            writeln!(f, "{}", "  All resources are up-to-date!".green())?;
        }
        writeln!(f)
    }

    fn section(&self, f: &mut Formatter<'_>, section: &Section, summary: &Summary) -> fmt::Result {
        let count = summary.count(section.kind);
        if count == 0 {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(
            f,
            "{}",
            format!("{} Resources to {} ({count}):", section.icon, section.title)
                .color(section.color)
        )?;
        writeln!(f, "{}", RULE.color(section.color))?;

        for change in summary.changes_of(section.kind) {
            writeln!(
                f,
                "{}",
                format!("  {} {}", section.marker, change.address).color(section.color)
            )?;
            writeln!(f, "{}", format!("    Type: {}", change.resource_type).bright_black())?;
            self.details(f, change, section.kind)?;
        }
        Ok(())
    }

    fn details(&self, f: &mut Formatter<'_>, change: &Change, kind: ChangeKind) -> fmt::Result {
        match kind {
            ChangeKind::Update => write_diff(f, change),
            ChangeKind::Replace => {
                writeln!(
                    f,
                    "{}",
                    "    ⚠ This resource will be destroyed and recreated".bright_yellow()
                )?;
                if self.options.verbose {
                    write_diff(f, change)?;
                }
                Ok(())
            }
            ChangeKind::Create if self.options.verbose => {
                write_listing(f, change, true, Color::BrightGreen)
            }
            ChangeKind::Delete if self.options.verbose => {
                write_listing(f, change, false, Color::BrightRed)
            }
            _ => Ok(()),
        }
    }

    fn unrecognized(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        if summary.unrecognized() == 0 {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(
            f,
            "{}",
            format!("? Unrecognized changes ({}):", summary.unrecognized()).bright_black()
        )?;
        writeln!(f, "{}", RULE.bright_black())?;
        for change in summary.unrecognized_changes() {
            let actions: Vec<&str> = change.actions.iter().map(|a| a.as_str()).collect();
            writeln!(f, "  ? {}", change.address)?;
            writeln!(
                f,
                "{}",
                format!("    Type: {}, actions: [{}]", change.resource_type, actions.join(", "))
                    .bright_black()
            )?;
        }
        Ok(())
    }

    fn warnings(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.report.warnings.is_empty() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(
            f,
            "{}",
            " 🔍 SECURITY & RISK ANALYSIS "
                .on_yellow()
                .black()
                .bold()
        )?;
        writeln!(f)?;

        for level in RiskLevel::DESCENDING {
            let found: Vec<_> = self.report.warnings_at(level).collect();
            if found.is_empty() {
                continue;
            }

            let (title, color) = level_heading(level);
            writeln!(f, "{}", format!("{title} ({}):", found.len()).color(color))?;
            writeln!(f, "{}", RULE.color(color))?;
            for warning in found {
                writeln!(f, "{}", format!("  • {}", warning.message).color(color))?;
                writeln!(f, "{}", format!("    Resource: {}", warning.resource).bright_black())?;
                writeln!(f, "{}", format!("    {}", warning.explanation).bright_black())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }

    fn destructive_banner(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        if !summary.has_destructive_changes() {
            return Ok(());
        }

        writeln!(f)?;
        writeln!(
            f,
            "{}{}",
            " ⚠ WARNING ".on_red().white().bold(),
            " This plan includes destructive changes!".red()
        )?;
        if summary.to_delete() > 0 {
            writeln!(
                f,
                "{}",
                format!("  → {} resource(s) will be DESTROYED", summary.to_delete()).red()
            )?;
        }
        if summary.to_replace() > 0 {
            writeln!(
                f,
                "{}",
                format!(
                    "  → {} resource(s) will be REPLACED (destroyed and recreated)",
                    summary.to_replace()
                )
                .red()
            )?;
        }
        writeln!(f)?;
        writeln!(f, "{}", "  Please review carefully before applying.".yellow())
    }
}

fn level_heading(level: RiskLevel) -> (&'static str, Color) {
    match level {
        RiskLevel::Critical => ("🚨 CRITICAL WARNINGS", Color::Red),
        RiskLevel::High => ("⚠️  HIGH RISK WARNINGS", Color::Yellow),
        RiskLevel::Medium => ("ℹ️  MEDIUM RISK WARNINGS", Color::Cyan),
        RiskLevel::Low => ("LOW RISK WARNINGS", Color::White),
    }
}

fn write_diff(f: &mut Formatter<'_>, change: &Change) -> fmt::Result {
    for line in attribute_diff(change) {
        let text = match &line {
            DiffLine::Unknown { depth, key } => {
                format!("{}• {key}: (known after apply)", indent(*depth)).cyan()
            }
            DiffLine::Changed {
                depth,
                key,
                before,
                after,
            } => format!("{}~ {key}: {before} → {after}", indent(*depth)).yellow(),
            DiffLine::Added { depth, key, value } => {
                format!("{}+ {key}: {value}", indent(*depth)).green()
            }
            DiffLine::Removed { depth, key, value } => {
                format!("{}- {key}: {value}", indent(*depth)).red()
            }
            DiffLine::Nested { depth, key } => format!("{}~ {key}:", indent(*depth)).yellow(),
        };
        writeln!(f, "{text}")?;
    }
    Ok(())
}

fn write_listing(f: &mut Formatter<'_>, change: &Change, after_side: bool, color: Color) -> fmt::Result {
    for (key, value) in attribute_listing(change, after_side) {
        writeln!(f, "{}", format!("      {key}: {value}").color(color))?;
    }
    Ok(())
}

fn indent(depth: usize) -> String {
    " ".repeat(6 + depth * 2)
}
