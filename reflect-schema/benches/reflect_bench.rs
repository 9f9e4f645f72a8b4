use criterion::{criterion_group, criterion_main, Criterion};
use reflect_schema::{Reflect, Reflector};
use std::collections::HashMap;
use std::hint::black_box;

#[derive(Reflect)]
#[allow(dead_code)]
struct Audit {
    #[reflect(json = "createdAt")]
    created_at: std::time::SystemTime,
    #[reflect(json = "createdBy,omitempty")]
    created_by: String,
}

#[derive(Reflect)]
#[allow(dead_code)]
struct Text(String);

#[derive(Reflect)]
#[allow(dead_code)]
struct Profile {
    #[reflect(json = "id", jsonschema = "required,minimum=1")]
    id: u64,
    #[reflect(json = "name", jsonschema = "title=the name,minLength=1,maxLength=64")]
    name: String,
    #[reflect(json = "bio,omitempty")]
    bio: Text,
    #[reflect(json = "friends,omitempty")]
    friends: Vec<u64>,
    #[reflect(json = "tags,omitempty", jsonschema = "enum=admin,enum=user")]
    tags: HashMap<String, String>,
    #[reflect(json = "photo,omitempty")]
    photo: Vec<u8>,
    #[reflect(json = "parent,omitempty")]
    parent: Option<Box<Profile>>,
    #[reflect(embed)]
    audit: Audit,
}

#[derive(Reflect)]
#[allow(dead_code)]
struct Outer {
    #[reflect(json = "profile")]
    profile: Profile,
    #[reflect(json = "history")]
    history: Vec<Audit>,
}

fn bench_reflect(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflect");

    group.bench_function("profile", |b| {
        let reflector = Reflector::new();
        b.iter(|| reflector.reflect::<Profile>().unwrap());
    });

    group.bench_function("embedded", |b| {
        let reflector = Reflector::new();
        b.iter(|| reflector.reflect::<Outer>().unwrap());
    });

    group.bench_function("do_not_reference", |b| {
        let reflector = Reflector::new().with_do_not_reference(true);
        b.iter(|| reflector.reflect::<Audit>().unwrap());
    });

    group.bench_function("expanded_struct", |b| {
        let reflector = Reflector::new().with_expanded_struct(true);
        b.iter(|| reflector.reflect::<Outer>().unwrap());
    });

    group.bench_function("with_comments", |b| {
        let comments = HashMap::from([
            (format!("{}::Profile", module_path!()), "A user profile".to_string()),
            (format!("{}::Profile.name", module_path!()), "Display name".to_string()),
            (format!("{}::Text", module_path!()), "Free text".to_string()),
        ]);
        let reflector = Reflector::new().with_comment_map(comments);
        b.iter(|| reflector.reflect::<Outer>().unwrap());
    });

    group.finish();
}

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");

    group.bench_function("uncached", |b| {
        let reflector = Reflector::new();
        b.iter(|| black_box(reflector.reflect::<Outer>().unwrap()));
    });

    group.bench_function("cache_hit", |b| {
        let reflector = Reflector::new().with_cache(true);
        reflector.reflect::<Outer>().unwrap();
        b.iter(|| black_box(reflector.reflect::<Outer>().unwrap()));
    });

    group.bench_function("bounded_cache", |b| {
        let reflector = Reflector::new().with_cache(true).with_max_cache_entries(1);
        b.iter(|| {
            black_box(reflector.reflect::<Outer>().unwrap());
            black_box(reflector.reflect::<Profile>().unwrap());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_reflect, bench_cache);
criterion_main!(benches);
