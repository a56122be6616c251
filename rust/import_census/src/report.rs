//! Sorted listings of the three census populations.

use serde::Serialize;

use crate::census::CensusReport;
use crate::config::ReportFormat;
use crate::driver::Completion;
use crate::entity::{ModuleEntity, Origin};
use crate::errors::CensusResult;
use crate::registry::Snapshot;
use crate::resolver::Provenance;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub origin: Origin,
    pub builtin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub title: String,
    pub entries: Vec<ReportEntry>,
}

impl ReportSection {
    pub fn from_snapshot<M: ModuleEntity>(title: impl Into<String>, snapshot: &Snapshot<M>) -> Self {
        let entries = snapshot
            .iter()
            .map(|(name, module)| {
                let origin = Origin::of(&**module);
                ReportEntry {
                    name: name.clone(),
                    builtin: origin.is_builtin(),
                    origin,
                }
            })
            .collect();
        Self {
            title: title.into(),
            entries,
        }
    }
}

/// Base, static and dynamic sections, in output order.
pub fn sections<M: ModuleEntity>(report: &CensusReport<M>) -> [ReportSection; 3] {
    let target = report.target.display_name();
    [
        ReportSection::from_snapshot("Essential base modules", &report.base),
        ReportSection::from_snapshot(format!("Static imports by script {target}"), &report.static_imports),
        ReportSection::from_snapshot(
            format!("Modules added by executing script {target}"),
            &report.dynamic_imports,
        ),
    ]
}

pub fn render_text<M: ModuleEntity>(report: &CensusReport<M>) -> String {
    let mut out = String::new();
    for section in sections(report) {
        out.push_str(&format!("\n==== {} ====\n\n", section.title));
        for entry in &section.entries {
            out.push_str(&format!("{} {}\n", entry.name, entry.origin));
        }
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    target: String,
    provenance: &'a Provenance,
    completion: Completion,
    suppressed: &'a [String],
    base: Vec<ReportEntry>,
    static_imports: Vec<ReportEntry>,
    dynamic_imports: Vec<ReportEntry>,
}

pub fn render_json<M: ModuleEntity>(report: &CensusReport<M>) -> CensusResult<String> {
    let [base, static_imports, dynamic_imports] = sections(report);
    let document = JsonReport {
        target: report.target.display_name(),
        provenance: &report.provenance,
        completion: report.completion,
        suppressed: &report.suppression.removed,
        base: base.entries,
        static_imports: static_imports.entries,
        dynamic_imports: dynamic_imports.entries,
    };
    let mut rendered = serde_json::to_string_pretty(&document)?;
    rendered.push('\n');
    Ok(rendered)
}

pub fn render<M: ModuleEntity>(report: &CensusReport<M>, format: ReportFormat) -> CensusResult<String> {
    match format {
        ReportFormat::Text => Ok(render_text(report)),
        ReportFormat::Json => render_json(report),
    }
}
