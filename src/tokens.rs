/// Decide whether `token` designates `name` on the command line.
/// Single-character names use a single dash (`-v`); longer names use a double dash (`--verbose`).
fn designates(token: &str, name: &str) -> bool {
    if name.len() == 1 {
        token.strip_prefix('-').map_or(false, |rest| rest == name)
    } else {
        token.strip_prefix("--").map_or(false, |rest| rest == name)
    }
}

/// The raw token list plus a parallel consumption bitmap.
///
/// Claiming operations never mutate in place; each returns a rewritten copy with the
/// relevant indices marked consumed, leaving the receiver untouched.
/// A consumed index is never unmarked and never matched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenStore {
    tokens: Vec<String>,
    consumed: Vec<bool>,
}

impl TokenStore {
    pub(crate) fn new(tokens: Vec<String>) -> Self {
        let consumed = vec![false; tokens.len()];
        Self { tokens, consumed }
    }

    /// Claim the first unconsumed token designating any of `names`.
    ///
    /// Names are tried in declared order; for each name the tokens are scanned left to
    /// right, and the first match wins outright.
    pub(crate) fn claim_flag(&self, names: &[&str]) -> Option<Self> {
        for name in names {
            for (index, token) in self.tokens.iter().enumerate() {
                if self.consumed[index] || !designates(token, name) {
                    continue;
                }

                let mut next = self.clone();
                next.consumed[index] = true;
                return Some(next);
            }
        }

        None
    }

    /// Claim the first unconsumed token designating any of `names`, along with the
    /// token positioned immediately after it as the value.
    ///
    /// `Some((_, Some(value)))` is a full match: both indices are consumed.
    /// The value index is claimed by position, whether or not something already consumed it.
    /// `Some((_, None))` means the name sat at the very end of the token list: the name
    /// token is consumed, but there was nothing left to bind.
    pub(crate) fn claim_option(&self, names: &[&str]) -> Option<(Self, Option<String>)> {
        for name in names {
            for (index, token) in self.tokens.iter().enumerate() {
                if self.consumed[index] || !designates(token, name) {
                    continue;
                }

                let mut next = self.clone();
                next.consumed[index] = true;

                return match self.tokens.get(index + 1) {
                    Some(value) => {
                        next.consumed[index + 1] = true;
                        Some((next, Some(value.clone())))
                    }
                    None => Some((next, None)),
                };
            }
        }

        None
    }

    /// Claim the first unconsumed token, whatever its shape.
    /// A `--foo` token nothing else has claimed is a legitimate positional value.
    pub(crate) fn claim_next(&self) -> Option<(Self, String)> {
        let index = self.consumed.iter().position(|consumed| !consumed)?;
        let mut next = self.clone();
        next.consumed[index] = true;
        Some((next, self.tokens[index].clone()))
    }

    /// Mark every remaining token consumed, discarding them.
    pub(crate) fn chop(&self) -> Self {
        let mut next = self.clone();
        next.consumed.iter_mut().for_each(|consumed| *consumed = true);
        next
    }

    /// Mark every remaining token consumed, returning them in original order.
    pub(crate) fn chop_remainder(&self) -> (Self, Vec<String>) {
        let remainder = self
            .tokens
            .iter()
            .zip(self.consumed.iter())
            .filter(|(_, consumed)| !**consumed)
            .map(|(token, _)| token.clone())
            .collect();
        (self.chop(), remainder)
    }

    pub(crate) fn unconsumed(&self) -> usize {
        self.consumed.iter().filter(|consumed| !**consumed).count()
    }

    pub(crate) fn tokens(&self) -> impl Iterator<Item = (&str, bool)> {
        self.tokens
            .iter()
            .zip(self.consumed.iter())
            .map(|(token, consumed)| (token.as_str(), *consumed))
    }
}
