use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eos_core::{Kinematics, Options};
use eos_observable::Observable;
use eos_params::Parameters;
use eos_physics::build_registry;

fn branching_ratio_bench(c: &mut Criterion) {
    let registry = build_registry().unwrap();
    let p = Parameters::defaults().unwrap();
    let options = Options::from_pairs([("l", "mu")]);
    let bin = Kinematics::from_pairs([("q2_min", 0.02), ("q2_max", 12.0)]);
    let br = registry.make("B->pilnu::BR", &p, &bin, &options).unwrap();
    c.bench_function("b_to_pi_l_nu_integrated_br", |b| {
        b.iter(|| black_box(br.evaluate().unwrap()));
    });

    let point = Kinematics::from_pairs([("q2", 4.0)]);
    let differential = registry.make("B->pilnu::dBR/dq2", &p, &point, &options).unwrap();
    c.bench_function("b_to_pi_l_nu_differential_br", |b| {
        b.iter(|| black_box(differential.evaluate().unwrap()));
    });

    let ratio_kinematics = Kinematics::from_pairs([
        ("q2_mu_min", 0.02),
        ("q2_mu_max", 12.0),
        ("q2_tau_min", 3.2),
        ("q2_tau_max", 12.0),
    ]);
    let ratio = registry.make("B->pilnu::R_pi", &p, &ratio_kinematics, &Options::new()).unwrap();
    c.bench_function("b_to_pi_l_nu_r_pi", |b| {
        b.iter(|| black_box(ratio.evaluate().unwrap()));
    });
}

criterion_group!(benches, branching_ratio_bench);
criterion_main!(benches);
