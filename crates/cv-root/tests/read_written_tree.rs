//! Integration tests over ROOT files built in memory: TTree, TBranch and
//! TLeaf streamers, multi-basket columns and projections.

mod common;

use approx::assert_relative_eq;
use common::{Branch, Leaf, TreeFile, cvvar_tree};
use cv_root::{Binning, KeyInfo, LeafType, RootError, RootFile, TreeSource, project};

fn open(spec: &TreeFile) -> RootFile {
    RootFile::from_bytes(spec.to_bytes(), "cvvar.root").expect("written file should parse")
}

#[test]
fn tree_metadata_and_leaf_types() {
    let f = open(&cvvar_tree(250));
    assert_eq!(
        f.list_keys().unwrap(),
        vec![KeyInfo { name: "cvvar_tree".into(), class_name: "TTree".into(), cycle: 1 }]
    );

    let tree = f.get_tree("cvvar_tree").unwrap();
    assert_eq!(tree.entries, 250);
    assert_eq!(tree.title, "cvvar_tree events");
    assert_eq!(tree.branch_names(), vec!["ene_l", "length", "nhits", "vertex"]);
    let leaves: Vec<(LeafType, usize)> =
        tree.branches.iter().map(|b| (b.leaf_type, b.leaf_len)).collect();
    assert_eq!(
        leaves,
        vec![(LeafType::F64, 1), (LeafType::F32, 1), (LeafType::I32, 1), (LeafType::F64, 3)]
    );

    let ene = tree.find_branch("ene_l").unwrap();
    assert_eq!(ene.entries, 250);
    assert_eq!(ene.n_baskets(), 4);
    assert_eq!(ene.basket_entry, vec![0, 64, 128, 192, 250]);
    assert_eq!(ene.basket_entries(3), 58);
}

#[test]
fn multi_basket_columns_match_every_leaf_type() {
    for compress in [true, false] {
        let spec = cvvar_tree(250).compress(compress);
        let f = open(&spec);
        let tree = f.get_tree("cvvar_tree").unwrap();
        for branch in spec.branches.iter().filter(|b| b.len == 1) {
            let got = f.branch_data(&tree, &branch.name).unwrap();
            let want: Vec<f64> = match branch.leaf {
                Leaf::F32 => branch.values.iter().map(|&v| v as f32 as f64).collect(),
                _ => branch.values.clone(),
            };
            assert_eq!(got, want, "branch {} (compress={compress})", branch.name);
        }
    }
}

#[test]
fn one_entry_per_basket() {
    let spec = TreeFile::new("t")
        .branch(Branch::scalar("x", Leaf::F64, vec![3.0, 1.0, 4.0, 1.0, 5.0]))
        .basket_entries(1);
    let f = open(&spec);
    let tree = f.get_tree("t").unwrap();
    assert_eq!(tree.find_branch("x").unwrap().n_baskets(), 5);
    assert_eq!(f.branch_data(&tree, "x").unwrap(), vec![3.0, 1.0, 4.0, 1.0, 5.0]);
}

#[test]
fn fixed_array_elements() {
    let f = open(&cvvar_tree(100));
    let tree = f.get_tree("cvvar_tree").unwrap();

    let y = f.branch_data(&tree, "vertex[1]").unwrap();
    assert_eq!(y.len(), 100);
    assert_eq!(y[7], -7.0);
    assert!(f.branch_data(&tree, "vertex[2]").unwrap().iter().all(|&z| z == 0.25));

    assert!(matches!(f.branch_data(&tree, "vertex"), Err(RootError::TypeMismatch(_))));
    assert!(matches!(f.branch_data(&tree, "vertex[3]"), Err(RootError::BranchNotFound(_))));
}

#[test]
fn projection_matches_a_direct_count() {
    let n = 250;
    let f = open(&cvvar_tree(n));
    let tree = f.get_tree("cvvar_tree").unwrap();
    let source = TreeSource::new(&f, &tree);

    let binning = Binning::parse("10, 0, 1000").unwrap();
    let h = project(&source, "h", "ene_l", &binning, "nhits > 19").unwrap();
    let h = h.as_1d().unwrap();
    let mut want = vec![0.0; 10];
    for i in (0..n).filter(|i| i % 40 > 19) {
        want[(i * 37 % 1000) / 100] += 1.0;
    }
    assert_eq!(h.content, want);
    assert_eq!(h.entries, want.iter().sum::<f64>() as u64);

    let binning = Binning::parse("10, 0, 1000, 5, 0, 5").unwrap();
    let h = project(&source, "h2", "length:ene_l", &binning, "").unwrap();
    let h = h.as_2d().unwrap();
    assert_eq!(h.entries, n as u64);
    assert_relative_eq!(h.integral(), n as f64);
    // entry 0: ene_l 0.5 -> x bin 0, length 0.0 -> y bin 0
    assert!(h.get(0, 0) >= 1.0);
}

#[test]
fn tree_without_entries() {
    let spec = TreeFile::new("empty").branch(Branch::scalar("x", Leaf::F64, Vec::new()));
    let f = open(&spec);
    let tree = f.get_tree("empty").unwrap();
    assert_eq!(tree.entries, 0);
    assert_eq!(tree.find_branch("x").unwrap().n_baskets(), 0);
    assert!(f.branch_data(&tree, "x").unwrap().is_empty());
}

#[test]
fn missing_tree_and_branch() {
    let f = open(&cvvar_tree(10));
    assert!(matches!(f.get_tree("no_such_tree"), Err(RootError::TreeNotFound(_))));
    let tree = f.get_tree("cvvar_tree").unwrap();
    assert!(matches!(f.branch_data(&tree, "no_such_branch"), Err(RootError::BranchNotFound(_))));
}

#[test]
fn written_file_opens_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cvvar.root");
    cvvar_tree(130).write(&path);
    let f = RootFile::open(&path).unwrap();
    let tree = f.get_tree("cvvar_tree").unwrap();
    assert_eq!(f.branch_data(&tree, "nhits").unwrap().len(), 130);
}
