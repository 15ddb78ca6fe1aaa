//! Drill-down navigation between workflows and their sub-workflows.
//!
//! [`WorkflowRelationships`] is a parent/child index over every workflow in a
//! bundle. [`NavigationTracker`] keeps the breadcrumb path the user walked to
//! reach the current workflow.

use crate::bundle::Bundle;
use ahash::AHashMap;
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

/// The known links of one workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relations {
    pub name: String,
    pub parents: Vec<String>,
    pub children: Vec<String>,
}

/// Parent/child links between workflows, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkflowRelationships {
    workflows: IndexMap<String, Relations>,
}

impl WorkflowRelationships {
    /// Scans every workflow's tasks for transition targets or action ids that
    /// name another workflow and records both directions of the link.
    pub fn build(bundle: &Bundle) -> Self {
        let mut workflows: IndexMap<String, Relations> = IndexMap::new();
        // Object keys and `fields.id` both name a workflow.
        let mut aliases: AHashMap<&str, String> = AHashMap::new();
        for workflow in bundle.workflows() {
            let id = workflow.id().to_string();
            aliases.entry(workflow.key).or_insert_with(|| id.clone());
            aliases.entry(workflow.id()).or_insert_with(|| id.clone());
            workflows.entry(id).or_insert_with(|| Relations {
                name: workflow.name().to_string(),
                ..Relations::default()
            });
        }

        let mut links = Vec::new();
        for workflow in bundle.workflows() {
            let parent = workflow.id();
            for (_, task) in workflow.tasks() {
                let targets = task
                    .next
                    .iter()
                    .flat_map(|transition| transition.targets.iter().map(String::as_str))
                    .chain(task.action_id());
                for target in targets {
                    if let Some(child) = aliases.get(target) {
                        if child != parent {
                            links.push((parent.to_string(), child.clone()));
                        }
                    }
                }
            }
        }

        for (parent, child) in links {
            if let Some(relations) = workflows.get_mut(&parent) {
                if !relations.children.contains(&child) {
                    relations.children.push(child.clone());
                }
            }
            if let Some(relations) = workflows.get_mut(&child) {
                if !relations.parents.contains(&parent) {
                    relations.parents.push(parent);
                }
            }
        }

        debug!(workflows = workflows.len(), "Built workflow relationships");
        Self { workflows }
    }

    pub fn get(&self, id: &str) -> Option<&Relations> {
        self.workflows.get(id)
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.get(id).map(|relations| relations.name.as_str())
    }

    pub fn parents(&self, id: &str) -> &[String] {
        self.get(id)
            .map(|relations| relations.parents.as_slice())
            .unwrap_or_default()
    }

    pub fn children(&self, id: &str) -> &[String] {
        self.get(id)
            .map(|relations| relations.children.as_slice())
            .unwrap_or_default()
    }

    pub fn is_child_of(&self, child: &str, parent: &str) -> bool {
        self.children(parent).iter().any(|id| id == child)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Relations)> {
        self.workflows.iter()
    }

    pub fn len(&self) -> usize {
        self.workflows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workflows.is_empty()
    }
}

/// One breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyEntry {
    pub id: String,
    pub name: String,
}

/// The drill-down path from a root workflow to the one currently shown.
#[derive(Debug, Clone, Default)]
pub struct NavigationTracker {
    relationships: WorkflowRelationships,
    hierarchy: Vec<HierarchyEntry>,
}

impl NavigationTracker {
    pub fn new(relationships: WorkflowRelationships) -> Self {
        Self {
            relationships,
            hierarchy: Vec::new(),
        }
    }

    pub fn relationships(&self) -> &WorkflowRelationships {
        &self.relationships
    }

    pub fn hierarchy(&self) -> &[HierarchyEntry] {
        &self.hierarchy
    }

    /// The workflow at the tip of the path.
    pub fn current(&self) -> Option<&HierarchyEntry> {
        self.hierarchy.last()
    }

    /// Starts a fresh path rooted at `id`.
    pub fn reset_to(&mut self, id: &str) {
        self.hierarchy = vec![self.entry(id)];
    }

    /// Moves into `target_id` after a sub-workflow was opened.
    ///
    /// A child of the current tip is pushed. A target already on the path
    /// truncates the path to it. A target whose parent is on the path
    /// truncates after the deepest such parent and is pushed there. Anything
    /// else starts a new path rooted at the target.
    pub fn handle_sub_workflow_click(&mut self, target_id: &str) -> &HierarchyEntry {
        let tip_is_parent = self
            .current()
            .is_some_and(|tip| self.relationships.is_child_of(target_id, &tip.id));

        if tip_is_parent {
            debug!(target_id, "Entering child workflow");
            let entry = self.entry(target_id);
            self.hierarchy.push(entry);
        } else if let Some(position) = self.hierarchy.iter().position(|e| e.id == target_id) {
            debug!(target_id, position, "Returning to workflow on path");
            self.hierarchy.truncate(position + 1);
        } else if let Some(ancestor) = self
            .hierarchy
            .iter()
            .rposition(|e| self.relationships.is_child_of(target_id, &e.id))
        {
            debug!(target_id, ancestor, "Branching from ancestor workflow");
            self.hierarchy.truncate(ancestor + 1);
            let entry = self.entry(target_id);
            self.hierarchy.push(entry);
        } else {
            debug!(target_id, "Unrelated workflow, starting new path");
            self.reset_to(target_id);
        }

        // The path is never empty after any branch above.
        &self.hierarchy[self.hierarchy.len() - 1]
    }

    /// Truncates the path to the breadcrumb at `index` and selects `id`.
    ///
    /// An index past the end leaves the path as is. Returns the id to show.
    pub fn handle_breadcrumb_navigate(&mut self, id: &str, index: usize) -> String {
        if index < self.hierarchy.len() {
            self.hierarchy.truncate(index + 1);
        }
        // A stale breadcrumb: the id wins over whatever sits at that index.
        if self.current().is_none_or(|tip| tip.id != id) {
            let entry = self.entry(id);
            match self.hierarchy.last_mut() {
                Some(tip) => *tip = entry,
                None => self.hierarchy.push(entry),
            }
        }
        id.to_string()
    }

    fn entry(&self, id: &str) -> HierarchyEntry {
        HierarchyEntry {
            id: id.to_string(),
            name: self.relationships.name(id).unwrap_or(id).to_string(),
        }
    }
}
