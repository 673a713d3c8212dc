use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eos_core::{Options, QualifiedName, ThreadPool};
use eos_params::Parameters;
use eos_physics::build_registry;
use eos_stats::{prior_predictive, ConstraintCatalogue, LogLikelihood, LogPrior};

fn likelihood_bench(c: &mut Criterion) {
    let catalogue = ConstraintCatalogue::instance().unwrap();
    let registry = build_registry().unwrap();
    let mut llh = LogLikelihood::new(Parameters::defaults().unwrap());
    for (name, _) in catalogue.iter() {
        llh.add_from_catalogue(&catalogue, &registry, name, &Options::new()).unwrap();
    }

    c.bench_function("log_likelihood_cached", |b| {
        b.iter(|| black_box(llh.evaluate().unwrap()));
    });

    let parameter = llh.parameters().get("B->pi::f_+(0)@BCL2008").unwrap();
    let mut toggle = false;
    c.bench_function("log_likelihood_after_write", |b| {
        b.iter(|| {
            toggle = !toggle;
            parameter.set(if toggle { 0.26 } else { 0.28 }).unwrap();
            black_box(llh.evaluate().unwrap())
        });
    });

    let name = QualifiedName::new("B^0->pi^+lnu::BR@HFLAV:2019A").unwrap();
    let mut single = LogLikelihood::new(Parameters::defaults().unwrap());
    single.add_from_catalogue(&catalogue, &registry, &name, &Options::new()).unwrap();
    let priors = [LogPrior::flat(single.parameters(), "B->pi::f_+(0)@BCL2008", 0.2, 0.3).unwrap()];
    let pool = ThreadPool::new(4).unwrap();
    c.bench_function("prior_predictive_256", |b| {
        b.iter(|| black_box(prior_predictive(single.observable_cache(), &priors, 256, 1, &pool).unwrap()));
    });
}

criterion_group!(benches, likelihood_bench);
criterion_main!(benches);
