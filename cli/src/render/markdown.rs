// Markdown Rendering
//
// Documentation-style report, suitable for a pull request comment.

use std::fmt::{self, Display, Formatter};

use infrasync_kernel::{Change, ChangeKind, PlanReport, RiskLevel, Summary};

use super::{attribute_diff, DiffLine};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    /// Attach a collapsible attribute diff to updates and replaces.
    pub detailed: bool,
    pub show_unchanged: bool,
}

impl MarkdownRenderer {
    pub fn render(&self, report: &PlanReport) -> String {
        MarkdownView {
            options: *self,
            report,
        }
        .to_string()
    }
}

fn heading(kind: ChangeKind) -> (&'static str, &'static str) {
    match kind {
        ChangeKind::Create => ("✅", "create"),
        ChangeKind::Update => ("📝", "update"),
        ChangeKind::Replace => ("🔄", "replace"),
        ChangeKind::Delete => ("❌", "destroy"),
        ChangeKind::NoOp => ("⚪", "leave unchanged"),
    }
}

fn table_label(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::Create => "✅ Create",
        ChangeKind::Update => "📝 Update",
        ChangeKind::Replace => "🔄 Replace",
        ChangeKind::Delete => "❌ Destroy",
        ChangeKind::NoOp => "⚪ Unchanged",
    }
}

struct MarkdownView<'a> {
    options: MarkdownRenderer,
    report: &'a PlanReport,
}

impl Display for MarkdownView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let summary = &self.report.summary;

        writeln!(f, "## 📋 Terraform Plan Summary")?;
        writeln!(f)?;
        writeln!(
            f,
            "**Terraform Version:** `{}` | **Format Version:** `{}`",
            summary.tool_version(),
            summary.format_version()
        )?;
        writeln!(f)?;

        if !summary.has_changes() {
            writeln!(f, "✅ **No changes.** Infrastructure is up-to-date.")?;
            writeln!(f)?;
            if !self.options.show_unchanged && summary.unrecognized() == 0 {
                return Ok(());
            }
        }

        self.table(f, summary)?;

        for kind in ChangeKind::ALL {
            if kind == ChangeKind::NoOp && !self.options.show_unchanged {
                continue;
            }
            self.section(f, summary, kind)?;
        }
        self.unrecognized(f, summary)?;

        if summary.has_destructive_changes() {
            writeln!(
                f,
                "> ⚠️ **Warning:** this plan includes destructive changes ({} to destroy, {} to replace). Review carefully before applying.",
                summary.to_delete(),
                summary.to_replace()
            )?;
            writeln!(f)?;
        }

        self.warnings(f)
    }
}

impl MarkdownView<'_> {
    fn table(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        writeln!(f, "| Action | Count |")?;
        writeln!(f, "|--------|-------|")?;
        for kind in ChangeKind::ALL {
            if kind == ChangeKind::NoOp && !self.options.show_unchanged {
                continue;
            }
            writeln!(f, "| {} | {} |", table_label(kind), summary.count(kind))?;
        }
        if summary.unrecognized() > 0 {
            writeln!(f, "| ❔ Unrecognized | {} |", summary.unrecognized())?;
        }
        writeln!(f)
    }

    fn section(&self, f: &mut Formatter<'_>, summary: &Summary, kind: ChangeKind) -> fmt::Result {
        let count = summary.count(kind);
        if count == 0 {
            return Ok(());
        }

        let (icon, verb) = heading(kind);
        writeln!(f, "### {icon} Resources to {verb} ({count})")?;
        writeln!(f)?;

        for change in summary.changes_of(kind) {
            writeln!(f, "- `{}` (`{}`)", change.address, change.resource_type)?;
        }
        writeln!(f)?;

        if self.options.detailed && matches!(kind, ChangeKind::Update | ChangeKind::Replace) {
            for change in summary.changes_of(kind) {
                write_details(f, change)?;
            }
        }
        Ok(())
    }

    fn unrecognized(&self, f: &mut Formatter<'_>, summary: &Summary) -> fmt::Result {
        if summary.unrecognized() == 0 {
            return Ok(());
        }

        writeln!(f, "### ❔ Unrecognized changes ({})", summary.unrecognized())?;
        writeln!(f)?;
        for change in summary.unrecognized_changes() {
            let actions: Vec<&str> = change.actions.iter().map(|a| a.as_str()).collect();
            writeln!(
                f,
                "- `{}` (`{}`): actions `[{}]`",
                change.address,
                change.resource_type,
                actions.join(", ")
            )?;
        }
        writeln!(f)
    }

    fn warnings(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.report.warnings.is_empty() {
            return Ok(());
        }

        writeln!(f, "### 🔍 Security & Risk Analysis")?;
        writeln!(f)?;

        for level in RiskLevel::DESCENDING {
            let found: Vec<_> = self.report.warnings_at(level).collect();
            if found.is_empty() {
                continue;
            }

            writeln!(f, "#### {}", level_heading(level))?;
            writeln!(f)?;
            for warning in found {
                writeln!(f, "- **{}**", warning.message)?;
                writeln!(f, "  - Resource: `{}`", warning.resource)?;
                writeln!(f, "  - {}", warning.explanation)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn level_heading(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Critical => "🚨 Critical Warnings",
        RiskLevel::High => "⚠️ High Risk Warnings",
        RiskLevel::Medium => "ℹ️ Medium Risk Warnings",
        RiskLevel::Low => "Low Risk Warnings",
    }
}

fn write_details(f: &mut Formatter<'_>, change: &Change) -> fmt::Result {
    let lines = attribute_diff(change);
    if lines.is_empty() {
        return Ok(());
    }

    writeln!(f, "<details>")?;
    writeln!(f, "<summary><code>{}</code> attribute changes</summary>", change.address)?;
    writeln!(f)?;
    writeln!(f, "```diff")?;
    for line in &lines {
        match line {
            DiffLine::Unknown { depth, key } => {
                writeln!(f, "!{}{key}: (known after apply)", pad(*depth))?
            }
            DiffLine::Changed {
                depth,
                key,
                before,
                after,
            } => {
                writeln!(f, "-{}{key}: {before}", pad(*depth))?;
                writeln!(f, "+{}{key}: {after}", pad(*depth))?;
            }
            DiffLine::Added { depth, key, value } => {
                writeln!(f, "+{}{key}: {value}", pad(*depth))?
            }
            DiffLine::Removed { depth, key, value } => {
                writeln!(f, "-{}{key}: {value}", pad(*depth))?
            }
            DiffLine::Nested { depth, key } => writeln!(f, " {}{key}:", pad(*depth))?,
        }
    }
    writeln!(f, "```")?;
    writeln!(f)?;
    writeln!(f, "</details>")?;
    writeln!(f)
}

fn pad(depth: usize) -> String {
    " ".repeat(1 + depth * 2)
}
