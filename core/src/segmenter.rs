use jieba_rs::Jieba;
use lazy_static::lazy_static;

lazy_static! {
    static ref JIEBA: Jieba = Jieba::new();
}

/// Splits text into word tokens without relying on whitespace.
///
/// Implementations must be deterministic for a given input and preserve the
/// order tokens appear in the text.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

impl<S: Segmenter + ?Sized> Segmenter for &S {
    fn segment(&self, text: &str) -> Vec<String> {
        (**self).segment(text)
    }
}

/// Dictionary segmenter backed by jieba, in precise mode with HMM for
/// out-of-vocabulary words.
#[derive(Clone, Copy)]
pub struct JiebaSegmenter<'a> {
    jieba: &'a Jieba,
    hmm: bool,
}

impl JiebaSegmenter<'static> {
    /// Segmenter over the bundled dictionary. The dictionary is loaded on first use.
    pub fn shared() -> Self {
        let jieba: &'static Jieba = &JIEBA;
        Self { jieba, hmm: true }
    }
}

impl<'a> JiebaSegmenter<'a> {
    pub fn new(jieba: &'a Jieba) -> Self {
        Self { jieba, hmm: true }
    }

    pub fn with_hmm(mut self, hmm: bool) -> Self {
        self.hmm = hmm;
        self
    }
}

impl Default for JiebaSegmenter<'static> {
    fn default() -> Self {
        Self::shared()
    }
}

impl Segmenter for JiebaSegmenter<'_> {
    fn segment(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, self.hmm)
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
