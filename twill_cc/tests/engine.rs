//! End-to-end engine tests against a table-backed mixture layer
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use twill_cc::error::{
    InferAssignmentsError, InitMixturesError, LoadError,
};
use twill_cc::feature::{FType, Schema};
use twill_cc::{CrossCat, KindEngine, KindMixture, KindModel, ProductModel};
use twill_stats::PitmanYor;

/// A parameter store whose "data fit" is just a table lookup: the log score
/// of feature `f` under a workspace with `g` groups is `ln_scores[f][g - 1]`.
#[derive(Clone, Debug, Default)]
struct TableModel {
    schema: Schema,
    ln_scores: Vec<Vec<f64>>,
}

impl ProductModel for TableModel {
    fn clear(&mut self) {
        self.schema = Schema::default();
        self.ln_scores.clear();
    }

    fn extend(&mut self, fragment: &Self) {
        self.schema.extend(&fragment.schema);
        // every fragment carries the full table
        if self.ln_scores.is_empty() {
            self.ln_scores = fragment.ln_scores.clone();
        }
    }

    fn schema(&self) -> Schema {
        self.schema.clone()
    }
}

struct TableMixture {
    col: usize,
}

impl KindMixture for TableMixture {
    type Model = TableModel;

    fn init_empty<R: Rng>(
        _model: &TableModel,
        n_groups: usize,
        _rng: &mut R,
    ) -> Self {
        TableMixture { col: n_groups - 1 }
    }

    fn score_feature<R: Rng>(
        &self,
        model: &TableModel,
        feature_ix: usize,
        rng: &mut R,
    ) -> f64 {
        // consume entropy like a real scorer would
        let jitter: f64 = rng.gen::<f64>() * 1E-9;
        model.ln_scores[feature_ix][self.col] + jitter
    }
}

/// Build a `CrossCat` whose kind `k` reports `k + 1` row groups and whose
/// parameter fragments split the schema according to `frag_asgn`.
fn table_cross_cat(
    n_kinds: usize,
    ftypes: Vec<FType>,
    frag_asgn: &[usize],
    ln_scores: Vec<Vec<f64>>,
    clustering: PitmanYor,
) -> CrossCat<TableModel> {
    assert_eq!(ftypes.len(), frag_asgn.len());
    let kinds = (0..n_kinds)
        .map(|k| {
            let frag: Vec<FType> = ftypes
                .iter()
                .zip(frag_asgn.iter())
                .filter(|(_, &a)| a == k)
                .map(|(&ftype, _)| ftype)
                .collect();
            KindModel {
                model: TableModel {
                    schema: Schema::new(frag),
                    ln_scores: ln_scores.clone(),
                },
                n_groups: k + 1,
            }
        })
        .collect();

    CrossCat {
        schema: Schema::new(ftypes),
        clustering,
        kinds,
    }
}

fn loaded_engine(
    cross_cat: &CrossCat<TableModel>,
    seed: u64,
) -> KindEngine<TableMixture> {
    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let mut engine = KindEngine::new();
    engine.load(cross_cat).unwrap();
    engine.init_empty_mixtures(cross_cat, &mut rng).unwrap();
    engine
}

// One score column per kind; feature f strongly prefers kind f mod n_kinds.
fn dominant_table(n_features: usize, n_kinds: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| {
            (0..n_kinds)
                .map(|k| if k == f % n_kinds { 30.0 } else { 0.0 })
                .collect()
        })
        .collect()
}

#[test]
fn load_composes_schema_from_kind_fragments() {
    let ftypes = vec![FType::Nich, FType::Gp, FType::Dd16, FType::Nich];
    let cross_cat = table_cross_cat(
        2,
        ftypes,
        &[0, 1, 0, 1],
        dominant_table(4, 2),
        PitmanYor::default(),
    );

    let mut engine: KindEngine<TableMixture> = KindEngine::new();
    engine.load(&cross_cat).unwrap();

    assert_eq!(engine.n_features(), 4);
    assert_eq!(engine.n_kinds(), 0);
}

#[test]
fn load_rejects_fragment_schema_mismatch() {
    let mut cross_cat = table_cross_cat(
        2,
        vec![FType::Nich, FType::Gp],
        &[0, 1],
        dominant_table(2, 2),
        PitmanYor::default(),
    );
    // declare a schema the fragments do not cover
    cross_cat.schema = Schema::new(vec![FType::Nich, FType::Dd256]);

    let mut engine: KindEngine<TableMixture> = KindEngine::new();
    assert!(matches!(
        engine.load(&cross_cat),
        Err(LoadError::SchemaMismatch { .. })
    ));
}

#[test]
fn init_empty_mixtures_requires_at_least_one_kind() {
    let cross_cat: CrossCat<TableModel> = CrossCat {
        schema: Schema::default(),
        clustering: PitmanYor::default(),
        kinds: Vec::new(),
    };

    let mut engine: KindEngine<TableMixture> = KindEngine::new();
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    assert_eq!(
        engine.init_empty_mixtures(&cross_cat, &mut rng),
        Err(InitMixturesError::EmptyDomain)
    );
}

#[test]
fn infer_without_mixtures_is_an_empty_domain() {
    let cross_cat = table_cross_cat(
        2,
        vec![FType::Nich, FType::Gp],
        &[0, 1],
        dominant_table(2, 2),
        PitmanYor::default(),
    );

    let mut engine: KindEngine<TableMixture> = KindEngine::new();
    engine.load(&cross_cat).unwrap();

    let mut asgn = vec![0, 1];
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    assert!(matches!(
        engine.infer_assignments(&mut asgn, 1, &mut rng),
        Err(InferAssignmentsError::EmptyDomain)
    ));
}

#[test]
fn infer_rejects_wrong_assignment_length() {
    let cross_cat = table_cross_cat(
        2,
        vec![FType::Nich, FType::Gp],
        &[0, 1],
        dominant_table(2, 2),
        PitmanYor::default(),
    );
    let engine = loaded_engine(&cross_cat, 0);

    let mut asgn = vec![0];
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    assert!(matches!(
        engine.infer_assignments(&mut asgn, 1, &mut rng),
        Err(InferAssignmentsError::AssignmentLengthMismatch { .. })
    ));
}

#[test]
fn infer_rejects_zero_iterations() {
    let cross_cat = table_cross_cat(
        2,
        vec![FType::Nich, FType::Gp],
        &[0, 1],
        dominant_table(2, 2),
        PitmanYor::default(),
    );
    let engine = loaded_engine(&cross_cat, 0);

    let mut asgn = vec![0, 1];
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    assert!(matches!(
        engine.infer_assignments(&mut asgn, 0, &mut rng),
        Err(InferAssignmentsError::Run(_))
    ));
}

#[test]
fn non_finite_score_is_a_numeric_error() {
    let mut ln_scores = dominant_table(3, 2);
    ln_scores[1][0] = f64::NAN;
    let cross_cat = table_cross_cat(
        2,
        vec![FType::Nich, FType::Gp, FType::Dpd],
        &[0, 1, 0],
        ln_scores,
        PitmanYor::default(),
    );
    let engine = loaded_engine(&cross_cat, 0);

    let mut asgn = vec![0, 1, 0];
    let mut rng = Xoshiro256Plus::seed_from_u64(0);
    assert!(matches!(
        engine.infer_assignments(&mut asgn, 1, &mut rng),
        Err(InferAssignmentsError::NumericError { feature_ix: 1, .. })
    ));
}

#[test]
fn dominant_scores_pull_each_feature_to_its_kind() {
    let n_features = 6;
    let n_kinds = 3;
    let cross_cat = table_cross_cat(
        n_kinds,
        vec![FType::Nich; n_features],
        &[0, 1, 2, 0, 1, 2],
        dominant_table(n_features, n_kinds),
        PitmanYor::default(),
    );
    let engine = loaded_engine(&cross_cat, 0xfeed);

    // start everything in kind 0
    let mut asgn = vec![0; n_features];
    let mut rng = Xoshiro256Plus::seed_from_u64(0xfeed);
    engine.infer_assignments(&mut asgn, 3, &mut rng).unwrap();

    let expected: Vec<usize> =
        (0..n_features).map(|f| f % n_kinds).collect();
    assert_eq!(asgn, expected);
}

#[test]
fn infer_assignments_is_reproducible_under_one_seed() {
    let n_features = 12;
    let n_kinds = 4;
    let mut table_rng = Xoshiro256Plus::seed_from_u64(33);
    let ln_scores: Vec<Vec<f64>> = (0..n_features)
        .map(|_| (0..n_kinds).map(|_| table_rng.gen::<f64>()).collect())
        .collect();
    let frag_asgn: Vec<usize> =
        (0..n_features).map(|f| f % n_kinds).collect();
    let cross_cat = table_cross_cat(
        n_kinds,
        vec![FType::Gp; n_features],
        &frag_asgn,
        ln_scores,
        PitmanYor::new(0.5, 0.2).unwrap(),
    );
    let engine = loaded_engine(&cross_cat, 1);

    let run_once = || -> Vec<usize> {
        let mut asgn = frag_asgn.clone();
        let mut rng = Xoshiro256Plus::seed_from_u64(0xdead_beef);
        engine.infer_assignments(&mut asgn, 20, &mut rng).unwrap();
        asgn
    };

    assert_eq!(run_once(), run_once());
}

#[test]
fn likelihoods_are_identical_across_thread_pool_sizes() {
    let n_features = 40;
    let n_kinds = 5;
    let mut table_rng = Xoshiro256Plus::seed_from_u64(77);
    let ln_scores: Vec<Vec<f64>> = (0..n_features)
        .map(|_| (0..n_kinds).map(|_| table_rng.gen::<f64>()).collect())
        .collect();
    let frag_asgn: Vec<usize> =
        (0..n_features).map(|f| f % n_kinds).collect();
    let cross_cat = table_cross_cat(
        n_kinds,
        vec![FType::Dd256; n_features],
        &frag_asgn,
        ln_scores,
        PitmanYor::default(),
    );
    let engine = loaded_engine(&cross_cat, 2);

    let build = |n_threads: usize| {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()
            .unwrap();
        pool.install(|| {
            let mut rng = Xoshiro256Plus::seed_from_u64(0xabad_cafe);
            engine.feature_likelihoods(&mut rng).unwrap()
        })
    };

    let serial = build(1);
    let parallel = build(4);
    assert_eq!(serial.raw_values(), parallel.raw_values());
}
