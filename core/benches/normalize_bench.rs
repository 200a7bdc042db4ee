use amharic_ir_core::tokenizer::Stopwords;
use amharic_ir_core::{Pipeline, StemmerKind};
use criterion::{criterion_group, criterion_main, Criterion};

const SAMPLE: &str = "<p>አዲስ አበባ የኢትዮጵያ ዋና ከተማ ናት። በከተማዋ ውስጥ ብዙ ተማሪዎች፣ መምህራን እና ነጋዴዎች ይኖራሉ። \
ትራንስፖርት፣ መኪና እና አውቶቡስ በየቀኑ ይንቀሳቀሳሉ። ፲፱፻፹፭ ዓ.ም. ኮቪድ 19</p>";

fn bench_process(c: &mut Criterion) {
    let text = SAMPLE.repeat(50);
    let pipeline = Pipeline::amharic(Stopwords::from_words(["እና", "ናት"]), StemmerKind::Affix);
    c.bench_function("normalize_sample", |b| b.iter(|| pipeline.normalizer().normalize(&text)));
    c.bench_function("process_sample", |b| b.iter(|| pipeline.process(&text)));
}

criterion_group!(benches, bench_process);
criterion_main!(benches);
