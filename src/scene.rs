//! Named mesh objects and their stack groups.
//!
//! A [`Scene`] is the arena that islands refer back to: islands carry only
//! an object name, and each operation looks the mesh up again here.

use crate::error::{Result, UvError};
use crate::mesh::UvMesh;
use crate::stack::StackGroups;

/// One mesh object.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// The mesh. Its name is the object name.
    pub mesh: UvMesh,
    /// Stack groups owned by the object.
    pub stack_groups: StackGroups,
}

impl SceneObject {
    /// Wrap a mesh with no stack groups.
    pub fn new(mesh: UvMesh) -> Self {
        Self {
            mesh,
            stack_groups: StackGroups::new(),
        }
    }

    /// Object name.
    pub fn name(&self) -> &str {
        self.mesh.name()
    }
}

/// An ordered collection of uniquely named objects.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// A scene holding a single mesh.
    pub fn from_mesh(mesh: UvMesh) -> Self {
        Self {
            objects: vec![SceneObject::new(mesh)],
        }
    }

    /// Add an object. Fails if the name is already taken.
    pub fn add_object(&mut self, mesh: UvMesh) -> Result<&mut SceneObject> {
        if self.object(mesh.name()).is_some() {
            return Err(UvError::invalid_param(
                "name",
                mesh.name(),
                "object names must be unique",
            ));
        }
        self.objects.push(SceneObject::new(mesh));
        let index = self.objects.len() - 1;
        Ok(&mut self.objects[index])
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the scene has no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over objects in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.iter()
    }

    /// Iterate mutably over objects in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.iter_mut()
    }

    /// Look up an object by name.
    pub fn object(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name() == name)
    }

    /// Look up an object by name for editing.
    pub fn object_mut(&mut self, name: &str) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|o| o.name() == name)
    }

    /// Like [`Scene::object_mut`], failing with `ObjectNotFound`.
    pub fn require_object_mut(&mut self, name: &str) -> Result<&mut SceneObject> {
        self.object_mut(name).ok_or_else(|| UvError::ObjectNotFound {
            name: name.to_string(),
        })
    }

    /// The mesh of an object.
    pub fn mesh(&self, name: &str) -> Option<&UvMesh> {
        self.object(name).map(|o| &o.mesh)
    }

    /// The mesh of an object, for editing.
    pub fn mesh_mut(&mut self, name: &str) -> Option<&mut UvMesh> {
        self.object_mut(name).map(|o| &mut o.mesh)
    }

    /// Recompute the cached island count of every group of every object.
    ///
    /// Returns the number of groups refreshed.
    pub fn refresh_group_counts(&mut self) -> usize {
        let mut refreshed = 0;
        for object in &mut self.objects {
            object.stack_groups.refresh_counts();
            refreshed += object.stack_groups.len();
        }
        log::debug!("refreshed {} group counts", refreshed);
        refreshed
    }

    /// Take the objects back out.
    pub fn into_meshes(self) -> Vec<UvMesh> {
        self.objects.into_iter().map(|o| o.mesh).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::build_from_polygons;
    use nalgebra::Point3;

    fn tri(name: &str) -> UvMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        build_from_polygons(name, &positions, &[vec![0, 1, 2]], None).unwrap()
    }

    #[test]
    fn test_lookup_by_name() {
        let mut scene = Scene::new();
        scene.add_object(tri("A")).unwrap();
        scene.add_object(tri("B")).unwrap();
        assert_eq!(scene.len(), 2);
        assert!(scene.mesh("B").is_some());
        assert!(scene.mesh("C").is_none());
        assert!(matches!(
            scene.require_object_mut("C"),
            Err(UvError::ObjectNotFound { .. })
        ));
    }

    /// A registry as read back from disk, with a cached count of zero.
    fn persisted(objects: &[&str]) -> StackGroups {
        let ids: Vec<String> = objects
            .iter()
            .map(|f| format!(r#"{{\"object_name\":\"{}\",\"face_indices\":[0]}}"#, f))
            .collect();
        let json = format!(
            r#"{{"groups":[{{"group_id":1,"name":"Group 1","color":[1.0,0.0,0.0],"islands_data":"[{}]","cached_island_count":0}}],"active_index":0,"auto_created":[]}}"#,
            ids.join(",")
        );
        serde_json::from_str(&json).unwrap()
    }

    #[test]
    fn test_refresh_group_counts_covers_every_object() {
        let mut scene = Scene::new();
        scene.add_object(tri("A")).unwrap().stack_groups = persisted(&["A", "B"]);
        scene.add_object(tri("B")).unwrap().stack_groups = persisted(&["B"]);
        assert_eq!(scene.object("A").unwrap().stack_groups.get(1).unwrap().cached_island_count, 0);

        assert_eq!(scene.refresh_group_counts(), 2);
        assert_eq!(scene.object("A").unwrap().stack_groups.get(1).unwrap().cached_island_count, 2);
        assert_eq!(scene.object("B").unwrap().stack_groups.get(1).unwrap().cached_island_count, 1);
    }

    #[test]
    fn test_unique_names() {
        let mut scene = Scene::from_mesh(tri("A"));
        assert!(scene.add_object(tri("A")).is_err());
        assert_eq!(scene.into_meshes().len(), 1);
    }
}
