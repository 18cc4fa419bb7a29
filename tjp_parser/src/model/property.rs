//! Tasks and resources share one property model: a tree of properties with
//! plain and per-scenario attribute values, described by a schema of
//! attribute definitions that `extend` can grow.

use crate::model::{Allocation, Interval, TaskDependency, WorkingHours};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PropertyKind {
    Task,
    Resource,
}

impl PropertyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyKind::Task => "task",
            PropertyKind::Resource => "resource",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            PropertyKind::Task => "Task",
            PropertyKind::Resource => "Resource",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AttributeKind {
    Date,
    Text,
    Reference,
    Duration,
    Integer,
    Boolean,
    Flags,
    Allocations,
    Dependencies,
    Intervals,
    WorkingHours,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttributeValue {
    Date(NaiveDateTime),
    Text(String),
    Reference { url: String, label: Option<String> },
    /// Scheduling ticks
    Duration(i64),
    Integer(i64),
    Boolean(bool),
    Flags(Vec<String>),
    Allocations(Vec<Allocation>),
    Dependencies(Vec<TaskDependency>),
    Intervals(Vec<Interval>),
    WorkingHours(WorkingHours),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDefinition {
    pub id: String,
    pub name: String,
    pub kind: AttributeKind,
    pub inherit: bool,
    pub scenario_specific: bool,
    pub user_defined: bool,
}

impl AttributeDefinition {
    fn builtin(id: &str, name: &str, kind: AttributeKind, inherit: bool, scenario_specific: bool) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind,
            inherit,
            scenario_specific,
            user_defined: false,
        }
    }
}

fn builtin_definitions(kind: PropertyKind) -> Vec<AttributeDefinition> {
    use AttributeDefinition as D;
    use AttributeKind as K;
    match kind {
        PropertyKind::Task => vec![
            D::builtin("allocate", "Allocations", K::Allocations, true, true),
            D::builtin("depends", "Dependencies", K::Dependencies, false, true),
            D::builtin("duration", "Duration", K::Duration, false, true),
            D::builtin("effort", "Effort", K::Duration, false, true),
            D::builtin("end", "End", K::Date, false, true),
            D::builtin("flags", "Flags", K::Flags, true, true),
            D::builtin("forward", "Scheduling", K::Boolean, true, true),
            D::builtin("length", "Length", K::Duration, false, true),
            D::builtin("priority", "Priority", K::Integer, true, true),
            D::builtin("start", "Start", K::Date, false, true),
        ],
        PropertyKind::Resource => vec![
            D::builtin("flags", "Flags", K::Flags, true, true),
            D::builtin("vacations", "Vacations", K::Intervals, true, true),
            D::builtin("workinghours", "Working Hours", K::WorkingHours, true, false),
        ],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    /// Full id; nested tasks are `parent.child`
    pub id: String,
    pub name: String,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Indexed by scenario
    pub scenario_attributes: Vec<BTreeMap<String, AttributeValue>>,
}

impl Property {
    pub fn get(&self, attribute: &str) -> Option<&AttributeValue> {
        self.attributes.get(attribute)
    }

    pub fn set(&mut self, attribute: &str, value: AttributeValue) {
        self.attributes.insert(attribute.to_string(), value);
    }

    pub fn get_scenario(&self, scenario_idx: usize, attribute: &str) -> Option<&AttributeValue> {
        self.scenario_attributes
            .get(scenario_idx)
            .and_then(|values| values.get(attribute))
    }

    pub fn set_scenario(&mut self, scenario_idx: usize, attribute: &str, value: AttributeValue) {
        if self.scenario_attributes.len() <= scenario_idx {
            self.scenario_attributes
                .resize_with(scenario_idx + 1, BTreeMap::new);
        }
        self.scenario_attributes[scenario_idx].insert(attribute.to_string(), value);
    }

    /// Last segment of the full id
    pub fn local_id(&self) -> &str {
        self.id.rsplit('.').next().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertySet {
    pub kind: PropertyKind,
    definitions: Vec<AttributeDefinition>,
    properties: Vec<Property>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl PropertySet {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            definitions: builtin_definitions(kind),
            properties: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Add a property below `parent`; task ids are qualified by their parent
    pub fn add(&mut self, id: &str, name: &str, parent: Option<usize>) -> Result<usize, String> {
        let full_id = match (self.kind, parent.and_then(|p| self.properties.get(p))) {
            (PropertyKind::Task, Some(parent)) => format!("{}.{}", parent.id, id),
            _ => id.to_string(),
        };

        if self.index.contains_key(&full_id) {
            return Err(format!(
                "{} {} has already been defined",
                self.kind.display_name(),
                full_id
            ));
        }

        let idx = self.properties.len();
        self.properties.push(Property {
            id: full_id.clone(),
            name: name.to_string(),
            parent,
            children: Vec::new(),
            attributes: BTreeMap::new(),
            scenario_attributes: Vec::new(),
        });
        if let Some(parent) = parent.and_then(|p| self.properties.get_mut(p)) {
            parent.children.push(idx);
        }
        self.index.insert(full_id, idx);
        Ok(idx)
    }

    /// Copy the inheritable attributes of the parent into the property
    pub fn inherit_attributes(&mut self, idx: usize) {
        let Some(parent_idx) = self.properties.get(idx).and_then(|p| p.parent) else {
            return;
        };
        let Some(parent) = self.properties.get(parent_idx).cloned() else {
            return;
        };
        let inherited: Vec<&AttributeDefinition> =
            self.definitions.iter().filter(|d| d.inherit).collect();

        let mut plain = Vec::new();
        let mut scenario = Vec::new();
        for def in inherited {
            if let Some(value) = parent.get(&def.id) {
                plain.push((def.id.clone(), value.clone()));
            }
            for (sc, values) in parent.scenario_attributes.iter().enumerate() {
                if let Some(value) = values.get(&def.id) {
                    scenario.push((sc, def.id.clone(), value.clone()));
                }
            }
        }

        if let Some(property) = self.properties.get_mut(idx) {
            for (id, value) in plain {
                property.set(&id, value);
            }
            for (sc, id, value) in scenario {
                property.set_scenario(sc, &id, value);
            }
        }
    }

    pub fn get(&self, idx: usize) -> Option<&Property> {
        self.properties.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut Property> {
        self.properties.get_mut(idx)
    }

    pub fn by_id(&self, id: &str) -> Option<&Property> {
        self.index.get(id).and_then(|&idx| self.properties.get(idx))
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn definition(&self, id: &str) -> Option<&AttributeDefinition> {
        self.definitions.iter().find(|d| d.id == id)
    }

    pub fn definitions(&self) -> &[AttributeDefinition] {
        &self.definitions
    }

    /// Register a new attribute in the schema
    pub fn define(&mut self, definition: AttributeDefinition) -> Result<(), String> {
        if self.definition(&definition.id).is_some() {
            return Err(format!(
                "Attribute {} has already been defined for {}s",
                definition.id,
                self.kind.as_str()
            ));
        }
        self.definitions.push(definition);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_ids_are_qualified() {
        let mut tasks = PropertySet::new(PropertyKind::Task);
        let parent = tasks.add("build", "Build", None).unwrap();
        let child = tasks.add("compile", "Compile", Some(parent)).unwrap();

        assert_eq!(tasks.get(child).unwrap().id, "build.compile");
        assert_eq!(tasks.get(child).unwrap().local_id(), "compile");
        assert_eq!(tasks.get(parent).unwrap().children, vec![child]);
        assert!(tasks.by_id("build.compile").is_some());
        assert!(tasks.by_id("compile").is_none());
    }

    #[test]
    fn test_resource_ids_are_flat_and_unique() {
        let mut resources = PropertySet::new(PropertyKind::Resource);
        let team = resources.add("team", "Team", None).unwrap();
        resources.add("dev", "Developer", Some(team)).unwrap();
        assert!(resources.by_id("dev").is_some());

        let err = resources.add("dev", "Again", None).unwrap_err();
        assert_eq!(err, "Resource dev has already been defined");
    }

    #[test]
    fn test_inherit_attributes() {
        let mut tasks = PropertySet::new(PropertyKind::Task);
        let parent = tasks.add("p", "P", None).unwrap();
        {
            let p = tasks.get_mut(parent).unwrap();
            p.set_scenario(0, "priority", AttributeValue::Integer(700));
            p.set_scenario(0, "start", AttributeValue::Integer(1));
        }
        let child = tasks.add("c", "C", Some(parent)).unwrap();
        tasks.inherit_attributes(child);

        let c = tasks.get(child).unwrap();
        assert_eq!(c.get_scenario(0, "priority"), Some(&AttributeValue::Integer(700)));
        assert_eq!(c.get_scenario(0, "start"), None);
    }

    #[test]
    fn test_define_rejects_duplicates() {
        let mut tasks = PropertySet::new(PropertyKind::Task);
        let def = AttributeDefinition {
            id: "Cost".into(),
            name: "Cost center".into(),
            kind: AttributeKind::Text,
            inherit: false,
            scenario_specific: false,
            user_defined: true,
        };
        tasks.define(def.clone()).unwrap();
        assert!(tasks.define(def).is_err());
        assert!(tasks.definition("priority").is_some());
    }
}
