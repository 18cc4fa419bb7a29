//! Project model the grammar actions build
//!
//! Only what the parser needs to store and cross-check. Nothing here
//! schedules or renders.

pub mod allocation;
pub mod calendar;
pub mod logical;
pub mod project;
pub mod property;
pub mod report;

pub use allocation::{Allocation, SelectionMode, TaskDependency};
pub use calendar::{weekday_index, weekday_range, Interval, TimeInterval, WorkingHours, WEEKDAY_NAMES};
pub use logical::{LogicalExpression, Operand, Operation, Operator};
pub use project::{Project, ProjectSettings, RealFormat, Scenario};
pub use property::{
    AttributeDefinition, AttributeKind, AttributeValue, Property, PropertyKind, PropertySet,
};
pub use report::{ColumnDefinition, Report, ReportElement, ReportKind, SortCriterion};
