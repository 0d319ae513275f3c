//! Data model for import reconciliation.
//!
//! Rows arrive as raw JSON maps (one per file line or API item) and are
//! lifted into typed [`ImportRow`] values exactly once, in
//! [`Batch::from_raw`]. Placeholder sentinels (`""`, `"<null>"`, `null`)
//! become `None` at that boundary, so nothing downstream compares strings
//! against sentinels.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use vendo_core::{CompanyAware, CompanyId, EntityId};

use crate::messages::{MessageKind, ValidationMessage};

/// Placeholder some exporters write instead of leaving a cell empty.
pub const NULL_SENTINEL: &str = "<null>";

/// A raw, unparsed row as handed over by the file/API parser.
pub type RawRow = Map<String, Value>;

// ---------------------------------------------------------------------------
// Actions and kinds
// ---------------------------------------------------------------------------

/// Action a row asks for (declared) or will perform (effective).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    /// Insert a new entity (code 0).
    Create,
    /// Modify an existing entity (code 1).
    Update,
    /// Soft-delete an existing entity (code 2).
    Delete,
    /// Full resync marker (code 50).
    Unknown,
}

impl ImportAction {
    /// Numeric code used in import files.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            ImportAction::Create => 0,
            ImportAction::Update => 1,
            ImportAction::Delete => 2,
            ImportAction::Unknown => 50,
        }
    }

    /// Parse a numeric file code.
    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ImportAction::Create),
            1 => Some(ImportAction::Update),
            2 => Some(ImportAction::Delete),
            50 => Some(ImportAction::Unknown),
            _ => None,
        }
    }

    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportAction::Create => "create",
            ImportAction::Update => "update",
            ImportAction::Delete => "delete",
            ImportAction::Unknown => "unknown",
        }
    }

    /// Parse the `action` cell of a raw row. Accepts numbers, numeric
    /// strings and action names.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_i64().and_then(Self::from_code),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ImportAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(code) = trimmed.parse::<i64>() {
            return Self::from_code(code).ok_or_else(|| format!("Unknown action code: {code}"));
        }
        match trimmed.to_lowercase().as_str() {
            "create" => Ok(ImportAction::Create),
            "update" => Ok(ImportAction::Update),
            "delete" => Ok(ImportAction::Delete),
            "unknown" => Ok(ImportAction::Unknown),
            _ => Err(format!("Unknown action: {s}")),
        }
    }
}

/// Entity kinds a batch can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Machines,
    Locations,
    Regions,
    Clients,
    Products,
    Packings,
    Planograms,
    Users,
}

impl EntityKind {
    /// Every importable kind.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Machines,
        EntityKind::Locations,
        EntityKind::Regions,
        EntityKind::Clients,
        EntityKind::Products,
        EntityKind::Packings,
        EntityKind::Planograms,
        EntityKind::Users,
    ];

    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Machines => "machines",
            EntityKind::Locations => "locations",
            EntityKind::Regions => "regions",
            EntityKind::Clients => "clients",
            EntityKind::Products => "products",
            EntityKind::Packings => "packings",
            EntityKind::Planograms => "planograms",
            EntityKind::Users => "users",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown entity kind: {s}"))
    }
}

/// Kinds of reference data the validators resolve against. Includes the
/// dependent tables consulted by deletion protection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Region,
    Location,
    Client,
    ClientType,
    Machine,
    MachineType,
    MachineCategory,
    Warehouse,
    MeterType,
    Product,
    Packing,
    Planogram,
    PlanogramItem,
    RotationGroupItem,
    MachineColumn,
}

impl ReferenceKind {
    /// Convert to string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Region => "region",
            ReferenceKind::Location => "location",
            ReferenceKind::Client => "client",
            ReferenceKind::ClientType => "client_type",
            ReferenceKind::Machine => "machine",
            ReferenceKind::MachineType => "machine_type",
            ReferenceKind::MachineCategory => "machine_category",
            ReferenceKind::Warehouse => "warehouse",
            ReferenceKind::MeterType => "meter_type",
            ReferenceKind::Product => "product",
            ReferenceKind::Packing => "packing",
            ReferenceKind::Planogram => "planogram",
            ReferenceKind::PlanogramItem => "planogram_item",
            ReferenceKind::RotationGroupItem => "rotation_group_item",
            ReferenceKind::MachineColumn => "machine_column",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field values
// ---------------------------------------------------------------------------

/// A present cell value. Absence is `Option::None`, never a sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl FieldValue {
    /// Lift a raw JSON cell, collapsing empty and placeholder values to `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(FieldValue::Int)
                .or_else(|| n.as_f64().map(FieldValue::Float)),
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() || trimmed == NULL_SENTINEL {
                    None
                } else {
                    Some(FieldValue::Text(trimmed.to_string()))
                }
            }
            Value::Array(_) | Value::Object(_) => Some(FieldValue::Text(value.to_string())),
        }
    }

    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret as an internal entity id (integers or numeric text).
    #[must_use]
    pub fn as_entity_id(&self) -> Option<EntityId> {
        match self {
            FieldValue::Int(i) => Some(EntityId::new(*i)),
            FieldValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Canonical string form used for equality across rows and snapshots.
    #[must_use]
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Lift a raw attribute map, dropping absent values.
#[must_use]
pub fn attributes_from_json(map: &Map<String, Value>, skip: &[&str]) -> BTreeMap<String, FieldValue> {
    map.iter()
        .filter(|(key, _)| !skip.contains(&key.as_str()))
        .filter_map(|(key, value)| FieldValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

// ---------------------------------------------------------------------------
// Rows and batches
// ---------------------------------------------------------------------------

/// Reference to the input record a message is about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordRef {
    /// 0-based position in the input batch; `None` for synthesized rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    pub external_id: String,
}

impl fmt::Display for RecordRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(position) => write!(f, "row {} ({})", position + 1, self.external_id),
            None => write!(f, "{}", self.external_id),
        }
    }
}

/// One row of a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportRow {
    /// 0-based input position; `None` for rows synthesized during resync.
    pub position: Option<usize>,
    /// Tenant-supplied natural key.
    pub external_id: String,
    pub name: Option<String>,
    /// Action as written in the file.
    pub declared_action: ImportAction,
    /// Action after normalization and resync expansion.
    pub action: ImportAction,
    /// Remaining cells, keyed by column name.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    /// The row revives a soft-deleted entity.
    #[serde(default)]
    pub resurrect_entity: bool,
    /// The row was synthesized by a full resync.
    #[serde(default)]
    pub action50_delete: bool,
    /// Internal id of the persisted entity a synthesized delete targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_id: Option<EntityId>,
    /// Reference columns resolved to internal ids.
    #[serde(default)]
    pub resolved: BTreeMap<String, EntityId>,
}

impl ImportRow {
    /// Create a row with only the identifying columns set.
    pub fn new(external_id: impl Into<String>, action: ImportAction) -> Self {
        Self {
            position: None,
            external_id: external_id.into(),
            name: None,
            declared_action: action,
            action,
            fields: BTreeMap::new(),
            resurrect_entity: false,
            action50_delete: false,
            cloud_id: None,
            resolved: BTreeMap::new(),
        }
    }

    /// Lift a raw row. Collects every problem in the row rather than
    /// stopping at the first one.
    pub fn from_raw(position: usize, raw: &RawRow) -> Result<Self, Vec<ValidationMessage>> {
        let mut problems = Vec::new();

        let external_id = raw
            .get("external_id")
            .and_then(FieldValue::from_json)
            .map(|v| v.to_string());

        let placeholder_ref = RecordRef {
            position: Some(position),
            external_id: external_id.clone().unwrap_or_default(),
        };

        if external_id.is_none() {
            problems.push(
                ValidationMessage::for_record(placeholder_ref.clone(), MessageKind::MissingMandatoryField)
                    .with_arg("external_id"),
            );
        }

        let action = match raw.get("action") {
            Some(value) => match ImportAction::from_json(value) {
                Some(action) => Some(action),
                None => {
                    problems.push(
                        ValidationMessage::for_record(placeholder_ref.clone(), MessageKind::InvalidAction)
                            .with_arg(value.to_string()),
                    );
                    None
                }
            },
            None => {
                problems.push(
                    ValidationMessage::for_record(placeholder_ref, MessageKind::MissingMandatoryField)
                        .with_arg("action"),
                );
                None
            }
        };

        match (external_id, action) {
            (Some(external_id), Some(action)) if problems.is_empty() => {
                let name = raw
                    .get("name")
                    .and_then(FieldValue::from_json)
                    .map(|v| v.to_string());
                let fields = attributes_from_json(raw, &["external_id", "name", "action"]);
                Ok(Self {
                    position: Some(position),
                    name,
                    fields,
                    ..Self::new(external_id, action)
                })
            }
            _ => Err(problems),
        }
    }

    /// Synthesize the DELETE row a full resync emits for a persisted entity
    /// missing from the file.
    #[must_use]
    pub fn synthesized_delete(entity: &PersistedEntity) -> Self {
        Self {
            name: entity.name.clone(),
            action50_delete: true,
            cloud_id: Some(entity.id),
            ..Self::new(entity.external_id.clone(), ImportAction::Delete)
        }
    }

    /// Set the name column.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a cell.
    #[must_use]
    pub fn with_field(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(column.into(), value);
        self
    }

    /// Set the input position.
    #[must_use]
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }

    /// Rewrite the effective action.
    #[must_use]
    pub fn with_action(mut self, action: ImportAction) -> Self {
        self.action = action;
        self
    }

    /// Turn the row into an UPDATE that revives a soft-deleted entity.
    #[must_use]
    pub fn resurrecting(mut self) -> Self {
        self.action = ImportAction::Update;
        self.resurrect_entity = true;
        self
    }

    /// Record a resolved reference.
    #[must_use]
    pub fn with_resolved(mut self, column: impl Into<String>, id: EntityId) -> Self {
        self.resolved.insert(column.into(), id);
        self
    }

    /// Drop a cell.
    #[must_use]
    pub fn without_field(mut self, column: &str) -> Self {
        self.fields.remove(column);
        self
    }

    /// Canonical value of a column, including the lifted `external_id` and
    /// `name` columns.
    #[must_use]
    pub fn value_key(&self, column: &str) -> Option<String> {
        match column {
            "external_id" => Some(self.external_id.clone()),
            "name" => self.name.clone(),
            _ => self.fields.get(column).map(FieldValue::key),
        }
    }

    /// Whether the row deletes (explicitly or synthesized).
    #[must_use]
    pub fn is_delete(&self) -> bool {
        self.action == ImportAction::Delete
    }

    /// Message reference for this row.
    #[must_use]
    pub fn record(&self) -> RecordRef {
        RecordRef {
            position: self.position,
            external_id: self.external_id.clone(),
        }
    }
}

/// An ordered, company-scoped sequence of rows of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    company_id: CompanyId,
    kind: EntityKind,
    rows: Vec<ImportRow>,
}

impl Batch {
    /// Create a batch from already-typed rows.
    #[must_use]
    pub fn new(company_id: CompanyId, kind: EntityKind, rows: Vec<ImportRow>) -> Self {
        Self {
            company_id,
            kind,
            rows,
        }
    }

    /// Build a batch from raw rows. Every malformed row is reported; the
    /// batch is rejected if any row is malformed.
    pub fn from_raw(
        company_id: CompanyId,
        kind: EntityKind,
        raw_rows: &[RawRow],
    ) -> Result<Self, Vec<ValidationMessage>> {
        let mut rows = Vec::with_capacity(raw_rows.len());
        let mut problems = Vec::new();

        for (position, raw) in raw_rows.iter().enumerate() {
            match ImportRow::from_raw(position, raw) {
                Ok(row) => rows.push(row),
                Err(mut row_problems) => problems.append(&mut row_problems),
            }
        }

        if problems.is_empty() {
            Ok(Self::new(company_id, kind, rows))
        } else {
            Err(problems)
        }
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub fn rows(&self) -> &[ImportRow] {
        &self.rows
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<ImportRow> {
        self.rows
    }

    /// Same company and kind, different rows.
    #[must_use]
    pub fn with_rows(self, rows: Vec<ImportRow>) -> Self {
        Self { rows, ..self }
    }

    /// Apply a row transform to every row.
    #[must_use]
    pub fn map_rows(self, f: impl FnMut(ImportRow) -> ImportRow) -> Self {
        let rows = self.rows.into_iter().map(f).collect();
        Self { rows, ..self }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A batch whose first row declares action 50 is a full resync.
    #[must_use]
    pub fn is_full_resync(&self) -> bool {
        self.rows
            .first()
            .is_some_and(|row| row.declared_action == ImportAction::Unknown)
    }

    /// Every external id in the batch.
    #[must_use]
    pub fn external_ids(&self) -> HashSet<String> {
        self.rows.iter().map(|row| row.external_id.clone()).collect()
    }

    /// Look up a row by external id.
    #[must_use]
    pub fn find(&self, external_id: &str) -> Option<&ImportRow> {
        self.rows.iter().find(|row| row.external_id == external_id)
    }
}

impl CompanyAware for Batch {
    fn company_id(&self) -> CompanyId {
        self.company_id
    }
}

// ---------------------------------------------------------------------------
// Snapshot records
// ---------------------------------------------------------------------------

/// A persisted entity of the kind being imported, alive or soft-deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedEntity {
    pub id: EntityId,
    pub external_id: String,
    pub name: Option<String>,
    pub alive: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, FieldValue>,
}

impl PersistedEntity {
    pub fn new(id: i64, external_id: impl Into<String>, alive: bool) -> Self {
        Self {
            id: EntityId::new(id),
            external_id: external_id.into(),
            name: None,
            alive,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn with_attribute(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.attributes.insert(column.into(), value);
        self
    }

    /// Canonical value of a column, mirroring [`ImportRow::value_key`].
    #[must_use]
    pub fn value_key(&self, column: &str) -> Option<String> {
        match column {
            "external_id" => Some(self.external_id.clone()),
            "name" => self.name.clone(),
            _ => self.attributes.get(column).map(FieldValue::key),
        }
    }
}

/// A record of some referenced or dependent kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: EntityId,
    pub external_id: Option<String>,
    pub alive: bool,
    #[serde(default)]
    pub attributes: BTreeMap<String, FieldValue>,
}

impl ReferenceRecord {
    pub fn new(id: i64, external_id: Option<&str>, alive: bool) -> Self {
        Self {
            id: EntityId::new(id),
            external_id: external_id.map(str::to_string),
            alive,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, column: impl Into<String>, value: FieldValue) -> Self {
        self.attributes.insert(column.into(), value);
        self
    }

    /// Whether `column` holds a foreign key to `target`.
    #[must_use]
    pub fn links_to(&self, column: &str, target: EntityId) -> bool {
        self.attributes
            .get(column)
            .and_then(FieldValue::as_entity_id)
            == Some(target)
    }
}

/// Reference sets fetched by the caller, keyed by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    sets: HashMap<ReferenceKind, Vec<ReferenceRecord>>,
}

impl ReferenceData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) one reference set.
    #[must_use]
    pub fn with_set(mut self, kind: ReferenceKind, records: Vec<ReferenceRecord>) -> Self {
        self.insert(kind, records);
        self
    }

    pub fn insert(&mut self, kind: ReferenceKind, records: Vec<ReferenceRecord>) {
        self.sets.insert(kind, records);
    }

    /// Records of one kind; empty if the set was never fetched.
    #[must_use]
    pub fn get(&self, kind: ReferenceKind) -> &[ReferenceRecord] {
        self.sets.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolve an external id against the alive records of a kind.
    #[must_use]
    pub fn find_alive(&self, kind: ReferenceKind, external_id: &str) -> Option<&ReferenceRecord> {
        self.get(kind)
            .iter()
            .find(|record| record.alive && record.external_id.as_deref() == Some(external_id))
    }

    /// Count alive records of `kind` whose `column` points at `target`.
    #[must_use]
    pub fn count_dependents(&self, kind: ReferenceKind, column: &str, target: EntityId) -> usize {
        self.get(kind)
            .iter()
            .filter(|record| record.alive && record.links_to(column, target))
            .count()
    }
}
