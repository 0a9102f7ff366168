use packprobe_core::FetchedModule;

/// Ordered, append-only collection of fetched modules. Append order is
/// fetch-completion order and is not stable across runs; the only guarantee
/// is that every successfully fetched reachable module appears exactly once.
#[derive(Debug, Default)]
pub struct Bundle {
    modules: Vec<FetchedModule>,
}

impl Bundle {
    pub fn push(&mut self, module: FetchedModule) {
        self.modules.push(module);
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn modules(&self) -> &[FetchedModule] {
        &self.modules
    }

    /// Concatenated source text handed to the minifier.
    pub fn concat(&self) -> String {
        self.modules.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n")
    }
}
