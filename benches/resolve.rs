use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use relative_layout::{
    Dimension, Insets, LayoutParams, ParentVerb, RelativeLayout, RelativeVerb, Resolver,
    ResolverConfig, Rule, Size,
};

fn chain_layout(len: usize) -> RelativeLayout {
    let mut layout = RelativeLayout::new(Size::new(1920, 1080));
    let mut previous = layout.add(
        LayoutParams::exact(40, 10).with_rule(Rule::Parent(ParentVerb::AlignParentTop)),
    );
    for _ in 1..len {
        previous = layout.add(
            LayoutParams::exact(40, 10)
                .with_margin(Insets::new(0, 2, 0, 0))
                .with_rule(Rule::Relative(RelativeVerb::Below, previous))
                .with_rule(Rule::Relative(RelativeVerb::AlignLeft, previous)),
        );
    }
    layout
}

fn fan_out_layout(width: usize) -> RelativeLayout {
    let mut layout = RelativeLayout::new(Size::new(1920, 1080));
    let hub = layout.add(
        LayoutParams::exact(200, 200).with_rule(Rule::Parent(ParentVerb::CenterInParent)),
    );
    for i in 0..width {
        let verb = match i % 4 {
            0 => RelativeVerb::Below,
            1 => RelativeVerb::Above,
            2 => RelativeVerb::LeftOf,
            _ => RelativeVerb::RightOf,
        };
        layout.add(
            LayoutParams::new(Dimension::Exact(8), Dimension::MatchParent)
                .with_rule(Rule::Relative(verb, hub)),
        );
    }
    layout
}

fn resolve_chain(c: &mut Criterion) {
    let layout = chain_layout(500);
    let resolver = Resolver::new(ResolverConfig::default());
    c.bench_function("resolve_chain_500", |b| {
        b.iter(|| resolver.resolve(black_box(&layout)).expect("resolve"));
    });
}

fn resolve_fan_out(c: &mut Criterion) {
    let layout = fan_out_layout(1000);
    let resolver = Resolver::new(ResolverConfig::default());
    c.bench_function("resolve_fan_out_1000", |b| {
        b.iter(|| resolver.resolve(black_box(&layout)).expect("resolve"));
    });
}

criterion_group!(benches, resolve_chain, resolve_fan_out);
criterion_main!(benches);
