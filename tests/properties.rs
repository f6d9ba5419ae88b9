//! Property tests for fingerprints, clustering, stacking, trim matching and SVG.

use std::collections::HashSet;

use nalgebra::{Point2, Point3};
use proptest::prelude::*;

use trimstack::geom::BoundingBox2d;
use trimstack::hotspot::{aspect_suited_trims, HspTrim};
use trimstack::island::{Fingerprint, Island, IslandId, Selection};
use trimstack::mesh::{build_from_polygons, FaceId, UvMesh};
use trimstack::scene::Scene;
use trimstack::stack::{group_by_similarity, StackOptions, StackSystem};
use trimstack::trim::{parse_svg, to_svg, Trim};

/// A strip of `n` connected quads whose UVs are scaled by `scale`.
fn strip(n: usize, scale: f64) -> UvMesh {
    let mut positions = Vec::new();
    for i in 0..=n {
        positions.push(Point3::new(i as f64, 0.0, 0.0));
        positions.push(Point3::new(i as f64, 1.0, 0.0));
    }
    let uv = |v: usize| Point2::new((v / 2) as f64 * scale, (v % 2) as f64 * scale);
    let mut faces = Vec::new();
    let mut uvs = Vec::new();
    for i in 0..n {
        let face = vec![2 * i, 2 * i + 2, 2 * i + 3, 2 * i + 1];
        uvs.push(face.iter().map(|&v| uv(v)).collect());
        faces.push(face);
    }
    build_from_polygons("Strip", &positions, &faces, Some(&uvs)).unwrap()
}

/// Separate quads with the given UV sizes, each placed at its own offset.
fn separate_quads(sizes: &[(f64, f64)]) -> UvMesh {
    let mut positions = Vec::new();
    let mut faces = Vec::new();
    let mut uvs = Vec::new();
    for (i, &(w, h)) in sizes.iter().enumerate() {
        let x = i as f64 * 2.0;
        let base = positions.len();
        positions.extend([
            Point3::new(x, 0.0, 0.0),
            Point3::new(x + 1.0, 0.0, 0.0),
            Point3::new(x + 1.0, 1.0, 0.0),
            Point3::new(x, 1.0, 0.0),
        ]);
        faces.push(vec![base, base + 1, base + 2, base + 3]);
        let u = i as f64 * 1.5;
        uvs.push(vec![
            Point2::new(u, 0.0),
            Point2::new(u + w, 0.0),
            Point2::new(u + w, h),
            Point2::new(u, h),
        ]);
    }
    build_from_polygons("Quads", &positions, &faces, Some(&uvs)).unwrap()
}

fn rect_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (0.0..0.9f64, 0.0..0.9f64, 0.01..0.5f64, 0.01..0.5f64)
        .prop_map(|(l, b, w, h)| (l, b, (l + w).min(1.0), (b + h).min(1.0)))
}

proptest! {
    #[test]
    fn prop_fingerprint_order_invariant(n in 1usize..8, eighths in 1u32..9, keys in prop::collection::vec(any::<u32>(), 8)) {
        let mesh = strip(n, f64::from(eighths) / 8.0);
        let faces: Vec<FaceId> = mesh.face_ids().collect();
        let mut shuffled = faces.clone();
        shuffled.sort_by_key(|f| keys[f.index() % keys.len()]);

        let a = Fingerprint::compute(&mesh, &faces);
        let b = Fingerprint::compute(&mesh, &shuffled);
        prop_assert_eq!(a.vert_count, b.vert_count);
        prop_assert_eq!(a.edge_count, b.edge_count);
        prop_assert_eq!(a.face_count, b.face_count);
        prop_assert_eq!(a.sim_index, b.sim_index);
        prop_assert_eq!(a, Fingerprint::compute(&mesh, &faces));
    }

    #[test]
    fn prop_clusters_partition(sizes in prop::collection::vec((1u32..4, 1u32..4), 1..12), threshold in 0.0..0.5f64) {
        let sizes: Vec<(f64, f64)> = sizes
            .iter()
            .map(|&(w, h)| (f64::from(w) / 8.0, f64::from(h) / 8.0))
            .collect();
        let mesh = separate_quads(&sizes);
        let islands = Island::collect(&mesh);
        let clusters = group_by_similarity(&islands, threshold);

        let mut seen = HashSet::new();
        for cluster in &clusters {
            prop_assert!(cluster.len() >= 2);
            for &i in cluster {
                prop_assert!(seen.insert(i), "island {} in two clusters", i);
            }
        }
        prop_assert_eq!(&clusters, &group_by_similarity(&islands, threshold));
    }

    #[test]
    fn prop_aspect_tolerance_monotonic(
        rects in prop::collection::vec(rect_strategy(), 1..10),
        aspect in 0.05..10.0f64,
        tolerance in 0.01..2.0f64,
        extra in 0.0..2.0f64,
        allow_rotation in any::<bool>(),
    ) {
        let trims: Vec<Trim> = rects
            .iter()
            .enumerate()
            .map(|(i, &(l, b, r, t))| Trim::new(format!("T{}", i), l, t, r, b))
            .collect();
        let container: Vec<HspTrim> = trims.iter().map(HspTrim::new).collect();
        let narrow = aspect_suited_trims(&container, aspect, allow_rotation, tolerance, 0.0);
        let wide = aspect_suited_trims(&container, aspect, allow_rotation, tolerance + extra, 0.0);
        prop_assert!(narrow.len() <= wide.len());
    }

    #[test]
    fn prop_svg_roundtrip(rects in prop::collection::vec(rect_strategy(), 0..10)) {
        let trims: Vec<Trim> = rects
            .iter()
            .enumerate()
            .map(|(i, &(l, b, r, t))| Trim::new(format!("Trim <{}>", i), l, t, r, b))
            .collect();
        let parsed = parse_svg(&to_svg(&trims), 0).unwrap();
        prop_assert_eq!(parsed.len(), trims.len());
        for (a, b) in trims.iter().zip(&parsed) {
            prop_assert_eq!(&a.name, &b.name);
            prop_assert!((a.left - b.left).abs() < 1e-9);
            prop_assert!((a.right - b.right).abs() < 1e-9);
            prop_assert!((a.bottom - b.bottom).abs() < 1e-9);
            prop_assert!((a.top - b.top).abs() < 1e-9);
        }
    }

    #[test]
    fn prop_duplicates_stack_onto_master(w in 1u32..9, h in 1u32..9, copies in 2usize..5) {
        let size = (f64::from(w) / 8.0, f64::from(h) / 8.0);
        let mesh = separate_quads(&vec![size; copies]);
        let mut scene = Scene::from_mesh(mesh);
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        prop_assert_eq!(system.stacks().len(), 1);

        let moved = system.stack_all(&mut scene, &options, &Selection::new());
        prop_assert_eq!(moved, copies - 1);

        let mesh = scene.mesh("Quads").unwrap();
        let boxes: Vec<BoundingBox2d> = mesh
            .face_ids()
            .map(|f| BoundingBox2d::from_points(mesh.face_loops(f).map(|l| mesh.uv(l))))
            .collect();
        for bbox in &boxes[1..] {
            prop_assert!((bbox.left() - boxes[0].left()).abs() < 1e-4);
            prop_assert!((bbox.bottom() - boxes[0].bottom()).abs() < 1e-4);
            prop_assert!((bbox.width() - boxes[0].width()).abs() < 1e-4);
            prop_assert!((bbox.height() - boxes[0].height()).abs() < 1e-4);
        }
    }

    #[test]
    fn prop_overlapping_groups_converge(
        copies in 3usize..7,
        keys in prop::collection::vec(any::<u32>(), 6),
        extras in prop::collection::vec(any::<prop::sample::Index>(), 6),
        whole_scene in any::<bool>(),
    ) {
        let mesh = separate_quads(&vec![(0.25, 0.25); copies]);
        let mut scene = Scene::from_mesh(mesh);
        let options = StackOptions::default();
        let system = StackSystem::new(&scene, &options);
        let ids: Vec<IslandId> = system.islands().iter().map(Island::id).collect();

        // A chain of links i..i+1, each with one extra member, in shuffled order.
        let mut links: Vec<usize> = (0..copies - 1).collect();
        links.sort_by_key(|&i| keys[i % keys.len()]);
        let groups = &mut scene.object_mut("Quads").unwrap().stack_groups;
        for &i in &links {
            let extra = extras[i % extras.len()].index(copies);
            let g = groups.create_group(None);
            groups.assign(g, &[ids[i].clone(), ids[i + 1].clone(), ids[extra].clone()]).unwrap();
        }

        let moved = if whole_scene {
            system.stack_all(&mut scene, &options, &Selection::new())
        } else {
            system.stack_all_groups(&mut scene, &options, &Selection::new())
        };
        prop_assert_eq!(moved, copies - 1);

        let mesh = scene.mesh("Quads").unwrap();
        let boxes: Vec<BoundingBox2d> = mesh
            .face_ids()
            .map(|f| BoundingBox2d::from_points(mesh.face_loops(f).map(|l| mesh.uv(l))))
            .collect();
        for bbox in &boxes[1..] {
            prop_assert!((bbox.left() - boxes[0].left()).abs() < 1e-6);
            prop_assert!((bbox.bottom() - boxes[0].bottom()).abs() < 1e-6);
        }
    }
}
