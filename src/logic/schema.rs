use std::collections::HashMap;

use crate::error::{PreprocessError, Result};
use crate::model::EntityKind;
use crate::store::traits::ContainmentQuery;

/// A declared "container kind contains contained kind" relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainmentEdge {
    pub container: EntityKind,
    pub contained: EntityKind,
}

impl ContainmentEdge {
    pub const fn new(container: EntityKind, contained: EntityKind) -> Self {
        Self {
            container,
            contained,
        }
    }
}

/// Containment edges in expansion order. A single pass over this list reaches
/// every image below a referenced container, so each container kind must come
/// before the edge that expands it.
pub const HIERARCHY: [ContainmentEdge; 6] = [
    ContainmentEdge::new(EntityKind::Project, EntityKind::Dataset),
    ContainmentEdge::new(EntityKind::Dataset, EntityKind::Image),
    ContainmentEdge::new(EntityKind::Screen, EntityKind::Plate),
    ContainmentEdge::new(EntityKind::Plate, EntityKind::Well),
    ContainmentEdge::new(EntityKind::Well, EntityKind::Image),
    ContainmentEdge::new(EntityKind::Fileset, EntityKind::Image),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// From a container down to what it contains.
    Contained,
    /// From a contained entity up to its containers.
    Container,
}

/// A named query following one edge in one direction, parameterized by the
/// id of the `from` entity and yielding ids of `to` entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryTemplate {
    pub name: &'static str,
    pub from: EntityKind,
    pub to: EntityKind,
    pub direction: Direction,
    pub sql: &'static str,
}

impl QueryTemplate {
    pub fn edge(&self) -> ContainmentEdge {
        match self.direction {
            Direction::Contained => ContainmentEdge::new(self.from, self.to),
            Direction::Container => ContainmentEdge::new(self.to, self.from),
        }
    }

    /// Run this template against the query service for one `from` id.
    pub async fn issue<Q: ContainmentQuery + ?Sized>(&self, query: &Q, id: i64) -> Result<Vec<i64>> {
        query
            .projection(self, id)
            .await
            .map_err(|source| PreprocessError::Query {
                template: self.name,
                id,
                source,
            })
    }
}

const fn down(name: &'static str, from: EntityKind, to: EntityKind, sql: &'static str) -> QueryTemplate {
    QueryTemplate {
        name,
        from,
        to,
        direction: Direction::Contained,
        sql,
    }
}

const fn up(name: &'static str, from: EntityKind, to: EntityKind, sql: &'static str) -> QueryTemplate {
    QueryTemplate {
        name,
        from,
        to,
        direction: Direction::Container,
        sql,
    }
}

pub const STANDARD_TEMPLATES: [QueryTemplate; 12] = [
    down(
        "project_datasets",
        EntityKind::Project,
        EntityKind::Dataset,
        "SELECT child FROM projectdatasetlink WHERE parent = $1",
    ),
    down(
        "dataset_images",
        EntityKind::Dataset,
        EntityKind::Image,
        "SELECT child FROM datasetimagelink WHERE parent = $1",
    ),
    down(
        "screen_plates",
        EntityKind::Screen,
        EntityKind::Plate,
        "SELECT child FROM screenplatelink WHERE parent = $1",
    ),
    down(
        "plate_wells",
        EntityKind::Plate,
        EntityKind::Well,
        "SELECT id FROM well WHERE plate = $1",
    ),
    down(
        "well_images",
        EntityKind::Well,
        EntityKind::Image,
        "SELECT image FROM wellsample WHERE well = $1",
    ),
    down(
        "fileset_images",
        EntityKind::Fileset,
        EntityKind::Image,
        "SELECT id FROM image WHERE fileset = $1",
    ),
    up(
        "image_fileset",
        EntityKind::Image,
        EntityKind::Fileset,
        "SELECT fileset FROM image WHERE fileset IS NOT NULL AND id = $1",
    ),
    up(
        "image_wells",
        EntityKind::Image,
        EntityKind::Well,
        "SELECT well FROM wellsample WHERE image = $1",
    ),
    up(
        "well_plate",
        EntityKind::Well,
        EntityKind::Plate,
        "SELECT plate FROM well WHERE id = $1",
    ),
    up(
        "plate_screens",
        EntityKind::Plate,
        EntityKind::Screen,
        "SELECT parent FROM screenplatelink WHERE child = $1",
    ),
    up(
        "image_datasets",
        EntityKind::Image,
        EntityKind::Dataset,
        "SELECT parent FROM datasetimagelink WHERE child = $1",
    ),
    up(
        "dataset_projects",
        EntityKind::Dataset,
        EntityKind::Project,
        "SELECT parent FROM projectdatasetlink WHERE child = $1",
    ),
];

/// Dispatch table from `(from, to)` kinds to the query that follows that hop.
#[derive(Debug, Clone)]
pub struct ContainmentSchema {
    templates: HashMap<(EntityKind, EntityKind), QueryTemplate>,
}

impl Default for ContainmentSchema {
    fn default() -> Self {
        Self::standard()
    }
}

impl ContainmentSchema {
    pub fn standard() -> Self {
        Self::from_templates(STANDARD_TEMPLATES)
    }

    pub fn from_templates(templates: impl IntoIterator<Item = QueryTemplate>) -> Self {
        Self {
            templates: templates
                .into_iter()
                .map(|template| ((template.from, template.to), template))
                .collect(),
        }
    }

    /// The query from `from` entities to related `to` entities. Asking for a
    /// hop that was never declared is a configuration error.
    pub fn template(&self, from: EntityKind, to: EntityKind) -> Result<&QueryTemplate> {
        self.templates
            .get(&(from, to))
            .ok_or(PreprocessError::UndeclaredEdge { from, to })
    }

    pub fn hierarchy(&self) -> &'static [ContainmentEdge] {
        &HIERARCHY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_schema_declares_both_directions_of_every_edge() {
        let schema = ContainmentSchema::standard();
        for edge in schema.hierarchy() {
            let down = schema.template(edge.container, edge.contained).unwrap();
            assert_eq!(down.direction, Direction::Contained);
            assert_eq!(down.edge(), *edge);

            let up = schema.template(edge.contained, edge.container).unwrap();
            assert_eq!(up.direction, Direction::Container);
            assert_eq!(up.edge(), *edge);
        }
    }

    #[test]
    fn test_undeclared_hop_is_an_error() {
        let schema = ContainmentSchema::standard();
        match schema.template(EntityKind::Project, EntityKind::Image) {
            Err(PreprocessError::UndeclaredEdge { from, to }) => {
                assert_eq!(from, EntityKind::Project);
                assert_eq!(to, EntityKind::Image);
            }
            other => panic!("expected undeclared edge, got {:?}", other),
        }
    }

    #[test]
    fn test_hierarchy_expands_containers_before_their_contents() {
        // every container kind is fully known before the edge that expands it
        for (index, edge) in HIERARCHY.iter().enumerate() {
            let later_fills_container = HIERARCHY[index..]
                .iter()
                .any(|other| other.contained == edge.container);
            assert!(!later_fills_container, "{:?} expanded too early", edge);
        }
    }

    #[test]
    fn test_templates_take_one_parameter() {
        for template in STANDARD_TEMPLATES {
            assert!(template.sql.contains("$1"), "{}", template.name);
            assert!(!template.sql.contains("$2"), "{}", template.name);
        }
    }
}
