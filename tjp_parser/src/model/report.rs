use crate::model::LogicalExpression;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReportKind {
    Export,
    HtmlTaskReport,
    HtmlResourceReport,
}

impl ReportKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "export" => ReportKind::Export,
            "htmltaskreport" => ReportKind::HtmlTaskReport,
            "htmlresourcereport" => ReportKind::HtmlResourceReport,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Export => "export",
            ReportKind::HtmlTaskReport => "htmltaskreport",
            ReportKind::HtmlResourceReport => "htmlresourcereport",
        }
    }
}

/// Column ids a report table knows, with their default titles
const DEFAULT_COLUMN_TITLES: &[(&str, &str)] = &[
    ("chart", ""),
    ("complete", "Completion"),
    ("daily", ""),
    ("duration", "Duration"),
    ("effort", "Effort"),
    ("end", "End"),
    ("flags", "Flags"),
    ("hourly", ""),
    ("id", "Id"),
    ("index", "Index"),
    ("length", "Length"),
    ("monthly", ""),
    ("name", "Name"),
    ("no", "No."),
    ("priority", "Priority"),
    ("quarterly", ""),
    ("resources", "Resources"),
    ("responsible", "Responsible"),
    ("start", "Start"),
    ("wbs", "WBS"),
    ("weekly", ""),
    ("yearly", ""),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDefinition {
    pub id: String,
    pub title: String,
}

impl ColumnDefinition {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortCriterion {
    pub attribute: String,
    pub ascending: bool,
    /// `None` sorts by the attribute independent of scenario
    pub scenario_idx: Option<usize>,
}

impl SortCriterion {
    pub fn new(attribute: impl Into<String>, ascending: bool, scenario_idx: Option<usize>) -> Self {
        Self {
            attribute: attribute.into(),
            ascending,
            scenario_idx,
        }
    }

    pub fn tree() -> Self {
        Self::new("tree", true, None)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportElement {
    pub columns: Vec<ColumnDefinition>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub headline: Option<String>,
    pub hide_resource: Option<LogicalExpression>,
    pub hide_task: Option<LogicalExpression>,
    pub rollup_task: Option<LogicalExpression>,
    pub scenarios: Vec<usize>,
    pub sort_resources: Vec<SortCriterion>,
    pub sort_tasks: Vec<SortCriterion>,
    pub task_root: Option<String>,
    pub time_format: Option<String>,
}

impl ReportElement {
    /// Element covering the whole project, first scenario only
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            columns: Vec::new(),
            start,
            end,
            headline: None,
            hide_resource: None,
            hide_task: None,
            rollup_task: None,
            scenarios: vec![0],
            sort_resources: vec![SortCriterion::tree()],
            sort_tasks: vec![SortCriterion::tree()],
            task_root: None,
            time_format: None,
        }
    }

    pub fn default_column_title(&self, id: &str) -> Option<&'static str> {
        DEFAULT_COLUMN_TITLES
            .iter()
            .find(|(column, _)| *column == id)
            .map(|(_, title)| *title)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub name: String,
    pub element: ReportElement,
}

impl Report {
    pub fn new(kind: ReportKind, name: impl Into<String>, element: ReportElement) -> Self {
        Self {
            kind,
            name: name.into(),
            element,
        }
    }
}
