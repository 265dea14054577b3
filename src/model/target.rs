use std::fmt;

/// Hierarchy node types that graph-modify requests may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Image,
    Fileset,
    Dataset,
    Project,
    Well,
    Plate,
    Screen,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Image,
        EntityKind::Fileset,
        EntityKind::Dataset,
        EntityKind::Project,
        EntityKind::Well,
        EntityKind::Plate,
        EntityKind::Screen,
    ];

    /// The type name requests use for this kind, e.g. `/Image`.
    pub fn external_name(&self) -> &'static str {
        match self {
            EntityKind::Image => "/Image",
            EntityKind::Fileset => "/Fileset",
            EntityKind::Dataset => "/Dataset",
            EntityKind::Project => "/Project",
            EntityKind::Well => "/Well",
            EntityKind::Plate => "/Plate",
            EntityKind::Screen => "/Screen",
        }
    }

    /// Reverse of [`EntityKind::external_name`]. Unknown names are not an error.
    pub fn from_external_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.external_name() == name)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // "/Image" -> "Image"
        f.write_str(&self.external_name()[1..])
    }
}

/// One entity instance, identified by kind and numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Target {
    pub kind: EntityKind,
    pub id: i64,
}

impl Target {
    pub fn new(kind: EntityKind, id: i64) -> Self {
        Self { kind, id }
    }

    pub fn image(id: i64) -> Self {
        Self::new(EntityKind::Image, id)
    }

    pub fn fileset(id: i64) -> Self {
        Self::new(EntityKind::Fileset, id)
    }

    pub fn is_kind(&self, kind: EntityKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
