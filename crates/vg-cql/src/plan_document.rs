//! Plan documents — a serialized block tree
//!
//! A plan document describes the block tree a view generator would assemble:
//! one tagged entry per block with its alias number, slots and filter.
//! Building a document first re-splits member paths against the extents the
//! document declares, so `Model.People.Name` reads member `Name` of extent
//! `Model.People`. It then registers every extent and member name it
//! mentions, so the generated aliases cannot shadow them, and builds the
//! tree bottom-up through the validating block constructors.
//!
//! ```yaml
//! name: people
//! root:
//!   kind: case
//!   alias: 2
//!   case_slot: 0
//!   slots:
//!     - case:
//!         member: People.Name
//!         else:
//!           column: People.Name
//!   child:
//!     kind: extent
//!     alias: 1
//!     extent: People
//!     slots:
//!       - member: People.Name
//! ```

use crate::error::{PlanError, PlanResult};
use crate::ir::block::{CqlBlock, JoinClause};
use crate::ir::bool_expr::BoolExpr;
use crate::ir::case_statement::CaseStatement;
use crate::ir::slot::SlotInfo;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use vg_core::serde_helpers::default_true;
use vg_core::{CoreError, CqlIdentifiers, Literal, MemberPath};

fn default_where() -> BoolExpr {
    BoolExpr::True
}

/// Top-level plan document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanDocument {
    /// Optional name, used in logs and CLI output
    #[serde(default)]
    pub name: Option<String>,

    /// Root block of the tree
    pub root: BlockDocument,
}

/// One block of a plan document, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockDocument {
    /// Leaf block over an extent
    Extent {
        alias: usize,
        extent: String,
        slots: Vec<SlotDocument>,
        #[serde(default = "default_where", rename = "where")]
        where_clause: BoolExpr,
    },
    /// Case block over a single child
    Case {
        alias: usize,
        case_slot: usize,
        slots: Vec<SlotDocument>,
        child: Box<BlockDocument>,
        #[serde(default = "default_where", rename = "where")]
        where_clause: BoolExpr,
    },
    /// Join of two or more children
    Join {
        alias: usize,
        slots: Vec<SlotDocument>,
        children: Vec<BlockDocument>,
        clauses: Vec<JoinClause>,
    },
    /// Union of two or more children
    Union {
        alias: usize,
        slots: Vec<SlotDocument>,
        children: Vec<BlockDocument>,
    },
}

/// One slot of a block document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotDocument {
    /// What the slot projects
    #[serde(flatten)]
    pub source: SlotSource,

    /// Whether the parent block reads this slot
    #[serde(default = "default_true")]
    pub required: bool,
}

/// What a slot document projects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotSource {
    /// A member of the input row
    Member(MemberPath),
    /// A constant standing in for a member
    Constant { member: MemberPath, value: Literal },
    /// Boolean slot `index` computed from an expression
    Boolean { expr: BoolExpr, index: usize },
    /// Boolean slot `index` passed through from the input row
    From(usize),
    /// A case statement constructing its member
    Case(CaseStatement),
    /// A column of one child of a join: either a member or boolean slot `from`
    Qualified {
        child: usize,
        #[serde(default)]
        member: Option<MemberPath>,
        #[serde(default)]
        from: Option<usize>,
    },
}

impl PlanDocument {
    /// Parse a plan document from YAML text
    pub fn from_yaml(content: &str) -> PlanResult<Self> {
        serde_yaml::from_str(content)
            .map_err(CoreError::from)
            .map_err(PlanError::from)
    }

    /// Parse a plan document from JSON text
    pub fn from_json(content: &str) -> PlanResult<Self> {
        serde_json::from_str(content)
            .map_err(CoreError::from)
            .map_err(PlanError::from)
    }

    /// Load a plan document; `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> PlanResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        }
    }

    /// Build the block tree.
    ///
    /// Every extent and member name in the document is registered with
    /// `identifiers` before any alias is generated.
    pub fn build(&self, identifiers: &mut CqlIdentifiers) -> PlanResult<CqlBlock> {
        let mut seen = HashSet::new();
        self.root.check_aliases(&mut seen)?;

        let extents = DeclaredExtents::collect(&self.root);
        let root = self.root.resolved(&extents);

        let mut names = Vec::new();
        root.collect_names(&mut names);
        for name in &names {
            identifiers.add_identifier(name);
        }
        log::debug!(
            "Registered {} names for plan {}",
            names.len(),
            self.name.as_deref().unwrap_or("<unnamed>")
        );

        root.build(identifiers)
    }
}

/// Extent names declared by the extent blocks of a document, most
/// components first
struct DeclaredExtents(Vec<String>);

impl DeclaredExtents {
    fn collect(root: &BlockDocument) -> Self {
        let mut extents = Vec::new();
        root.collect_extents(&mut extents);
        extents.sort_by(|a, b| {
            b.split('.')
                .count()
                .cmp(&a.split('.').count())
                .then_with(|| a.cmp(b))
        });
        extents.dedup();
        Self(extents)
    }

    fn resolve(&self, path: &MemberPath) -> MemberPath {
        self.0
            .iter()
            .find_map(|extent| path.with_extent(extent))
            .unwrap_or_else(|| path.clone())
    }
}

impl BlockDocument {
    /// Alias number of the block
    pub fn alias(&self) -> usize {
        match self {
            BlockDocument::Extent { alias, .. }
            | BlockDocument::Case { alias, .. }
            | BlockDocument::Join { alias, .. }
            | BlockDocument::Union { alias, .. } => *alias,
        }
    }

    fn slots(&self) -> &[SlotDocument] {
        match self {
            BlockDocument::Extent { slots, .. }
            | BlockDocument::Case { slots, .. }
            | BlockDocument::Join { slots, .. }
            | BlockDocument::Union { slots, .. } => slots,
        }
    }

    fn children(&self) -> &[BlockDocument] {
        match self {
            BlockDocument::Extent { .. } => &[],
            BlockDocument::Case { child, .. } => std::slice::from_ref(child.as_ref()),
            BlockDocument::Join { children, .. } | BlockDocument::Union { children, .. } => {
                children
            }
        }
    }

    fn collect_extents(&self, extents: &mut Vec<String>) {
        if let BlockDocument::Extent { extent, .. } = self {
            extents.push(extent.clone());
        }
        for child in self.children() {
            child.collect_extents(extents);
        }
    }

    /// Copy of the block with member paths re-split against `extents`
    fn resolved(&self, extents: &DeclaredExtents) -> BlockDocument {
        let resolve = |path: &MemberPath| extents.resolve(path);
        let resolve_slots = |slots: &[SlotDocument]| -> Vec<SlotDocument> {
            slots.iter().map(|slot| slot.resolved(extents)).collect()
        };
        let resolve_children = |children: &[BlockDocument]| -> Vec<BlockDocument> {
            children
                .iter()
                .map(|child| child.resolved(extents))
                .collect()
        };

        match self {
            BlockDocument::Extent {
                alias,
                extent,
                slots,
                where_clause,
            } => BlockDocument::Extent {
                alias: *alias,
                extent: extent.clone(),
                slots: resolve_slots(slots),
                where_clause: where_clause.map_members(&resolve),
            },
            BlockDocument::Case {
                alias,
                case_slot,
                slots,
                child,
                where_clause,
            } => BlockDocument::Case {
                alias: *alias,
                case_slot: *case_slot,
                slots: resolve_slots(slots),
                child: Box::new(child.resolved(extents)),
                where_clause: where_clause.map_members(&resolve),
            },
            BlockDocument::Join {
                alias,
                slots,
                children,
                clauses,
            } => BlockDocument::Join {
                alias: *alias,
                slots: resolve_slots(slots),
                children: resolve_children(children),
                clauses: clauses.clone(),
            },
            BlockDocument::Union {
                alias,
                slots,
                children,
            } => BlockDocument::Union {
                alias: *alias,
                slots: resolve_slots(slots),
                children: resolve_children(children),
            },
        }
    }

    fn check_aliases(&self, seen: &mut HashSet<usize>) -> PlanResult<()> {
        if !seen.insert(self.alias()) {
            return Err(PlanError::Document {
                message: format!("alias number {} is used by more than one block", self.alias()),
            });
        }
        self.children()
            .iter()
            .try_for_each(|child| child.check_aliases(seen))
    }

    fn collect_names(&self, names: &mut Vec<String>) {
        let mut add_path = |path: &MemberPath| {
            names.push(path.extent().to_string());
            names.extend(path.members().iter().cloned());
        };

        for slot in self.slots() {
            match &slot.source {
                SlotSource::Member(path) => add_path(path),
                SlotSource::Constant { member, .. } => add_path(member),
                SlotSource::Boolean { expr, .. } => expr.members().into_iter().for_each(&mut add_path),
                SlotSource::From(_) => {}
                SlotSource::Case(statement) => {
                    add_path(statement.member());
                    statement
                        .referenced_members()
                        .into_iter()
                        .for_each(&mut add_path);
                }
                SlotSource::Qualified { member, .. } => {
                    if let Some(path) = member {
                        add_path(path);
                    }
                }
            }
        }

        match self {
            BlockDocument::Extent {
                extent,
                where_clause,
                ..
            } => {
                where_clause.members().into_iter().for_each(&mut add_path);
                names.push(extent.clone());
            }
            BlockDocument::Case { where_clause, .. } => {
                where_clause.members().into_iter().for_each(&mut add_path);
            }
            BlockDocument::Join { clauses, .. } => {
                for condition in clauses.iter().flat_map(|c| &c.on) {
                    names.push(condition.left.field.clone());
                    names.push(condition.right.field.clone());
                }
            }
            BlockDocument::Union { .. } => {}
        }

        for child in self.children() {
            child.collect_names(names);
        }
    }

    fn build(&self, identifiers: &CqlIdentifiers) -> PlanResult<CqlBlock> {
        let slots = self
            .slots()
            .iter()
            .map(|slot| slot.to_slot_info(self.alias(), identifiers))
            .collect::<PlanResult<Vec<_>>>()?;

        match self {
            BlockDocument::Extent {
                alias,
                extent,
                where_clause,
                ..
            } => CqlBlock::extent(slots, extent.as_str(), where_clause.clone(), identifiers, *alias),
            BlockDocument::Case {
                alias,
                case_slot,
                child,
                where_clause,
                ..
            } => {
                let child = child.build(identifiers)?;
                CqlBlock::case(
                    slots,
                    *case_slot,
                    child,
                    where_clause.clone(),
                    identifiers,
                    *alias,
                )
            }
            BlockDocument::Join {
                alias,
                children,
                clauses,
                ..
            } => {
                let children = build_all(children, identifiers)?;
                CqlBlock::join(slots, children, clauses.clone(), identifiers, *alias)
            }
            BlockDocument::Union {
                alias, children, ..
            } => {
                let children = build_all(children, identifiers)?;
                CqlBlock::union(slots, children, identifiers, *alias)
            }
        }
    }
}

fn build_all(children: &[BlockDocument], identifiers: &CqlIdentifiers) -> PlanResult<Vec<CqlBlock>> {
    children
        .iter()
        .map(|child| child.build(identifiers))
        .collect()
}

impl SlotDocument {
    fn resolved(&self, extents: &DeclaredExtents) -> SlotDocument {
        let resolve = |path: &MemberPath| extents.resolve(path);
        let source = match &self.source {
            SlotSource::Member(path) => SlotSource::Member(resolve(path)),
            SlotSource::Constant { member, value } => SlotSource::Constant {
                member: resolve(member),
                value: value.clone(),
            },
            SlotSource::Boolean { expr, index } => SlotSource::Boolean {
                expr: expr.map_members(&resolve),
                index: *index,
            },
            SlotSource::From(index) => SlotSource::From(*index),
            SlotSource::Case(statement) => SlotSource::Case(statement.map_members(&resolve)),
            SlotSource::Qualified {
                child,
                member,
                from,
            } => SlotSource::Qualified {
                child: *child,
                member: member.as_ref().map(resolve),
                from: *from,
            },
        };
        SlotDocument {
            source,
            required: self.required,
        }
    }

    fn to_slot_info(&self, block_alias: usize, identifiers: &CqlIdentifiers) -> PlanResult<SlotInfo> {
        let slot = match &self.source {
            SlotSource::Member(path) => SlotInfo::member(path.clone()),
            SlotSource::Constant { member, value } => SlotInfo::constant(member.clone(), value.clone()),
            SlotSource::Boolean { expr, index } => SlotInfo::boolean(expr.clone(), *index, identifiers),
            SlotSource::From(index) => SlotInfo::boolean_column(*index, identifiers),
            SlotSource::Case(statement) => SlotInfo::case(statement.clone()),
            SlotSource::Qualified {
                child,
                member: Some(path),
                from: None,
            } => SlotInfo::qualified(*child, path.clone()),
            SlotSource::Qualified {
                child,
                member: None,
                from: Some(index),
            } => SlotInfo::qualified_boolean(*child, *index, identifiers),
            SlotSource::Qualified { .. } => {
                return Err(PlanError::Document {
                    message: format!(
                        "qualified slot in block {block_alias} needs exactly one of 'member' or 'from'"
                    ),
                })
            }
        };
        Ok(if self.required {
            slot
        } else {
            slot.not_required()
        })
    }
}

#[cfg(test)]
#[path = "plan_document_test.rs"]
mod tests;
