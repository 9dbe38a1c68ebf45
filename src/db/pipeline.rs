// src/db/pipeline.rs
// DOCUMENTATION: Typed aggregation pipeline builder
// PURPOSE: Describe unwind/sort/group/project stages independently of the driver

use crate::db::document::{value_at_path, values_equal};
use crate::db::filter::{compare_by, sort_document, SortField};
use mongodb::bson::{Bson, Document};

/// Per-group accumulator
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// Whole document of the first row seen in the group
    FirstRoot,
    /// Number of rows in the group
    Count,
}

/// One output field of a project stage
#[derive(Debug, Clone, PartialEq)]
pub enum Projection {
    Include(String),
    Computed { name: String, from: String },
    Exclude(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Unwind(String),
    Sort(Vec<SortField>),
    Group {
        key: String,
        accumulators: Vec<(String, Accumulator)>,
    },
    Project(Vec<Projection>),
}

/// Ordered list of stages
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unwind(mut self, field: impl Into<String>) -> Self {
        self.stages.push(Stage::Unwind(field.into()));
        self
    }

    pub fn sort(mut self, fields: Vec<SortField>) -> Self {
        self.stages.push(Stage::Sort(fields));
        self
    }

    pub fn group(mut self, key: impl Into<String>, accumulators: Vec<(&str, Accumulator)>) -> Self {
        self.stages.push(Stage::Group {
            key: key.into(),
            accumulators: accumulators
                .into_iter()
                .map(|(name, acc)| (name.to_string(), acc))
                .collect(),
        });
        self
    }

    pub fn project(mut self, fields: Vec<Projection>) -> Self {
        self.stages.push(Stage::Project(fields));
        self
    }

    /// Translate into MongoDB aggregation stage documents
    pub fn to_documents(&self) -> Vec<Document> {
        self.stages.iter().map(stage_document).collect()
    }

    /// Run the stages over an in-memory collection
    pub fn apply(&self, rows: Vec<Document>) -> Vec<Document> {
        self.stages
            .iter()
            .fold(rows, |rows, stage| apply_stage(stage, rows))
    }
}

fn stage_document(stage: &Stage) -> Document {
    let mut out = Document::new();
    match stage {
        Stage::Unwind(field) => {
            out.insert("$unwind", format!("${}", field));
        }
        Stage::Sort(fields) => {
            out.insert("$sort", sort_document(fields));
        }
        Stage::Group { key, accumulators } => {
            let mut group = Document::new();
            group.insert("_id", format!("${}", key));
            for (name, acc) in accumulators {
                let mut op = Document::new();
                match acc {
                    Accumulator::FirstRoot => op.insert("$first", "$$ROOT"),
                    Accumulator::Count => op.insert("$sum", 1),
                };
                group.insert(name.clone(), op);
            }
            out.insert("$group", group);
        }
        Stage::Project(fields) => {
            let mut project = Document::new();
            for field in fields {
                match field {
                    Projection::Include(name) => project.insert(name.clone(), 1),
                    Projection::Computed { name, from } => {
                        project.insert(name.clone(), format!("${}", from))
                    }
                    Projection::Exclude(name) => project.insert(name.clone(), 0),
                };
            }
            out.insert("$project", project);
        }
    }
    out
}

fn apply_stage(stage: &Stage, rows: Vec<Document>) -> Vec<Document> {
    match stage {
        Stage::Unwind(field) => unwind(field, rows),
        Stage::Sort(fields) => {
            let mut rows = rows;
            // Vec::sort_by is stable, so equal keys keep their input order
            rows.sort_by(|a, b| compare_by(a, b, fields));
            rows
        }
        Stage::Group { key, accumulators } => group(key, accumulators, rows),
        Stage::Project(fields) => rows.iter().map(|row| project(fields, row)).collect(),
    }
}

fn unwind(field: &str, rows: Vec<Document>) -> Vec<Document> {
    let mut out = Vec::new();
    for row in rows {
        match row.get(field) {
            Some(Bson::Array(items)) => {
                for item in items {
                    let mut copy = row.clone();
                    copy.insert(field.to_string(), item.clone());
                    out.push(copy);
                }
            }
            // Missing and null produce no rows
            None | Some(Bson::Null) => {}
            Some(_) => out.push(row),
        }
    }
    out
}

fn group(key: &str, accumulators: &[(String, Accumulator)], rows: Vec<Document>) -> Vec<Document> {
    // Groups keep first-seen order
    let mut groups: Vec<Document> = Vec::new();

    for row in rows {
        let group_key = value_at_path(&row, key).cloned().unwrap_or(Bson::Null);
        let existing = groups.iter_mut().find(|g| {
            g.get("_id")
                .is_some_and(|id| values_equal(id, &group_key))
        });

        match existing {
            Some(acc_doc) => {
                for (name, acc) in accumulators {
                    if let Accumulator::Count = acc {
                        let count = acc_doc.get_i32(name).unwrap_or(0);
                        acc_doc.insert(name.clone(), count + 1);
                    }
                }
            }
            None => {
                let mut acc_doc = Document::new();
                acc_doc.insert("_id", group_key);
                for (name, acc) in accumulators {
                    match acc {
                        Accumulator::FirstRoot => acc_doc.insert(name.clone(), row.clone()),
                        Accumulator::Count => acc_doc.insert(name.clone(), 1),
                    };
                }
                groups.push(acc_doc);
            }
        }
    }

    groups
}

fn project(fields: &[Projection], row: &Document) -> Document {
    let mut out = Document::new();

    let id_mentioned = fields.iter().any(|f| match f {
        Projection::Include(name) | Projection::Exclude(name) => name == "_id",
        Projection::Computed { name, .. } => name == "_id",
    });
    if !id_mentioned {
        if let Some(id) = row.get("_id") {
            out.insert("_id", id.clone());
        }
    }

    for field in fields {
        match field {
            Projection::Include(name) => {
                if let Some(value) = value_at_path(row, name) {
                    out.insert(name.clone(), value.clone());
                }
            }
            Projection::Computed { name, from } => {
                if let Some(value) = value_at_path(row, from) {
                    out.insert(name.clone(), value.clone());
                }
            }
            Projection::Exclude(_) => {}
        }
    }

    out
}
