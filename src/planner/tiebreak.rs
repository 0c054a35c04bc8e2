use rand::Rng;

/// Chooses among the top-ranked candidates. Injected so tests can pin it.
pub trait TieBreak {
    /// Returns an index in `0..len`; `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Uniform choice, the production behaviour.
#[derive(Debug, Clone)]
pub struct RandomTieBreak<R>(pub R);

impl<R: Rng> TieBreak for RandomTieBreak<R> {
    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}

/// Always the best-scored candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTieBreak;

impl TieBreak for FirstTieBreak {
    fn pick(&mut self, _len: usize) -> usize {
        0
    }
}
