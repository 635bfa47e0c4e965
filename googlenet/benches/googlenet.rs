#[macro_use]
extern crate criterion;

use criterion::Criterion;
use incept_googlenet::*;

fn engine(backend: Backend) -> GoogLeNet {
    GoogLeNet::new(&EngineConfig::default().with_backend(backend)).unwrap()
}

fn forward(bencher: &mut Criterion) {
    let net = engine(Backend::Cpu);
    let input = Tensor::zero(&[1, 3, 224, 224]);
    bencher.bench_function("forward_prob", |b| {
        b.iter(|| net.forward(input.clone(), &["prob"]).unwrap())
    });
    bencher.bench_function("forward_pool1", |b| {
        b.iter(|| net.forward(input.clone(), &["pool1"]).unwrap())
    });
}

fn oversampled_batch(bencher: &mut Criterion) {
    let input = Tensor::zero(&[10, 3, 224, 224]);
    for (name, backend) in [("batch10_cpu", Backend::Cpu), ("batch10_4threads", Backend::MultiThread(4))] {
        let net = engine(backend);
        bencher.bench_function(name, |b| {
            b.iter(|| net.forward(input.clone(), &["prob"]).unwrap())
        });
    }
}

pub fn benches() {
    let mut criterion: Criterion = Criterion::default().sample_size(10).configure_from_args();
    forward(&mut criterion);
    oversampled_batch(&mut criterion);
}
criterion_main!(benches);
