//! Stochastic L-system used to grow tree skeletons.
//!
//! Each [`LSystem::step`] rewrites every symbol of the current string in
//! parallel: a symbol with a rule is replaced by one of its productions, any
//! other symbol is copied through unchanged. The resulting string is handed to
//! a turtle interpreter on the render side together with the branching angle.
//!
//! Growth is exponential for most rule sets; callers bound the generation count
//! (3 to 5 is plenty for the built-in tree).

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Symbols the turtle interpreter understands. Anything else passes through untouched.
///
/// `F` draw forward, `f` move forward, `[`/`]` push/pop, `+`/`-` yaw,
/// `&`/`^` pitch, `\`/`/` roll, `|` turn around, `!` shrink trunk,
/// `'` next colour, `T` leaf billboard.
pub const TURTLE_SYMBOLS: &str = "Ff[]+-&^\\/|!'T";

/// One candidate replacement for a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub replacement: String,
    /// Relative weight (`Weighted`) or acceptance probability (`Threshold`).
    /// Ignored by `Uniform`.
    pub weight: f32,
}

/// All productions for a single symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub symbol: char,
    pub productions: Vec<Production>,
}

impl Rule {
    /// Rule with a single production of weight 1.
    pub fn simple(symbol: char, replacement: &str) -> Self {
        Self {
            symbol,
            productions: vec![Production {
                replacement: replacement.to_string(),
                weight: 1.0,
            }],
        }
    }
}

/// How a production is chosen when a rule has been matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// Every production equally likely; weights ignored.
    #[default]
    Uniform,
    /// One uniform draw in `[0, 1)` walked against cumulative weights. A draw
    /// past the last production keeps the symbol unchanged. With a single
    /// production this is "accept if draw < probability".
    Threshold,
    /// Probability proportional to weight. All-zero weights keep the symbol.
    Weighted,
}

/// Axiom, rules and turtle parameters for one kind of tree.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSet {
    pub name: String,
    pub axiom: String,
    /// Branching angle in radians. Only the interpreter uses it.
    pub angle: f32,
    /// Suggested number of rewrite passes.
    pub generations: u32,
    pub mode: SelectionMode,
    /// At most one rule per symbol; productions accumulate in declaration order.
    pub rules: Vec<Rule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::basic()
    }
}

impl RuleSet {
    /// Scalar defaults with no rules (every symbol maps to itself).
    pub fn empty() -> Self {
        Self {
            name: "Unnamed".to_string(),
            axiom: "A".to_string(),
            angle: 22.5_f32.to_radians(),
            generations: 5,
            mode: SelectionMode::Uniform,
            rules: Vec::new(),
        }
    }

    /// The built-in three-way branching tree.
    pub fn basic() -> Self {
        Self {
            name: "Basic".to_string(),
            rules: vec![
                Rule::simple('A', "[&FL!A]/////[&FL!A]///////[&FL!A]"),
                Rule::simple('F', "S/////F"),
                Rule::simple('S', "FL"),
                Rule::simple('L', "[^^T]"),
            ],
            ..Self::empty()
        }
    }

    /// Add a production, merging with an existing rule for the same symbol.
    pub fn add_production(&mut self, symbol: char, replacement: impl Into<String>, weight: f32) {
        let production = Production {
            replacement: replacement.into(),
            weight,
        };
        match self.rules.iter_mut().find(|r| r.symbol == symbol) {
            Some(rule) => rule.productions.push(production),
            None => self.rules.push(Rule {
                symbol,
                productions: vec![production],
            }),
        }
    }

    pub fn rule_for(&self, symbol: char) -> Option<&Rule> {
        self.rules.iter().find(|r| r.symbol == symbol)
    }

    /// Symbols in the axiom or any production that neither have a rule nor
    /// belong to [`TURTLE_SYMBOLS`], in first-seen order.
    pub fn literal_symbols(&self) -> Vec<char> {
        let productions = self
            .rules
            .iter()
            .flat_map(|r| r.productions.iter().map(|p| p.replacement.as_str()));
        let mut literals = Vec::new();
        for c in std::iter::once(self.axiom.as_str()).chain(productions).flat_map(str::chars) {
            if !TURTLE_SYMBOLS.contains(c) && self.rule_for(c).is_none() && !literals.contains(&c) {
                literals.push(c);
            }
        }
        literals
    }
}

/// The rewrite result handed to the turtle interpreter.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSkeleton {
    pub symbols: String,
    pub angle: f32,
}

/// A grammar plus its current string.
#[derive(Debug, Clone)]
pub struct LSystem {
    rules: RuleSet,
    current: String,
    generation: u32,
}

impl LSystem {
    /// Start at generation 0 with the axiom as the current string.
    pub fn new(rules: RuleSet) -> Self {
        let current = rules.axiom.clone();
        Self {
            rules,
            current,
            generation: 0,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn angle(&self) -> f32 {
        self.rules.angle
    }

    /// Back to the axiom.
    pub fn reset(&mut self) {
        self.current = self.rules.axiom.clone();
        self.generation = 0;
    }

    /// One parallel rewrite of the whole string.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut next = String::with_capacity(self.current.len() * 2);
        for symbol in self.current.chars() {
            match self.rules.rule_for(symbol) {
                Some(rule) => match choose(rule, self.rules.mode, rng) {
                    Some(replacement) => next.push_str(replacement),
                    None => next.push(symbol),
                },
                None => next.push(symbol),
            }
        }
        self.current = next;
        self.generation += 1;
    }

    /// `generations` sequential steps. No convergence check.
    pub fn run<R: Rng + ?Sized>(&mut self, generations: u32, rng: &mut R) {
        for _ in 0..generations {
            self.step(rng);
        }
        log::debug!(
            "L-system '{}' at generation {}: {} symbols",
            self.rules.name,
            self.generation,
            self.current.len()
        );
    }

    /// Snapshot of the current string and angle.
    pub fn skeleton(&self) -> TreeSkeleton {
        TreeSkeleton {
            symbols: self.current.clone(),
            angle: self.rules.angle,
        }
    }
}

/// Pick a production for `rule`, or `None` to keep the symbol as is.
fn choose<'a, R: Rng + ?Sized>(rule: &'a Rule, mode: SelectionMode, rng: &mut R) -> Option<&'a str> {
    let productions = &rule.productions;
    assert!(
        !productions.is_empty(),
        "rule for '{}' has no productions",
        rule.symbol
    );

    let picked = match mode {
        SelectionMode::Uniform => Some(&productions[rng.gen_range(0..productions.len())]),
        SelectionMode::Threshold => {
            let draw: f32 = rng.gen();
            let mut cumulative = 0.0;
            productions.iter().find(|p| {
                cumulative += p.weight;
                draw < cumulative
            })
        }
        SelectionMode::Weighted => WeightedIndex::new(productions.iter().map(|p| p.weight))
            .ok()
            .map(|dist| &productions[dist.sample(rng)]),
    };
    picked.map(|p| p.replacement.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const A_RULE: &str = "[&FL!A]/////[&FL!A]///////[&FL!A]";

    fn rng() -> StdRng {
        StdRng::seed_from_u64(2024)
    }

    #[test]
    fn unmatched_symbols_pass_through() {
        let rules = RuleSet {
            axiom: "X+Y".to_string(),
            rules: vec![Rule::simple('X', "XX")],
            ..RuleSet::empty()
        };
        let mut ls = LSystem::new(rules);
        ls.step(&mut rng());
        assert_eq!(ls.current(), "XX+Y");
    }

    #[test]
    fn literal_symbols_exclude_turtle_and_ruled() {
        assert!(RuleSet::basic().literal_symbols().is_empty());
        let rules = RuleSet {
            axiom: "X?Y".to_string(),
            rules: vec![Rule::simple('X', "F?Z")],
            ..RuleSet::empty()
        };
        assert_eq!(rules.literal_symbols(), vec!['?', 'Y', 'Z']);
    }

    #[test]
    fn turtle_vocabulary_survives_rewrites() {
        let rules = RuleSet {
            axiom: format!("{TURTLE_SYMBOLS}?"),
            rules: Vec::new(),
            ..RuleSet::empty()
        };
        let mut ls = LSystem::new(rules);
        ls.run(3, &mut rng());
        assert_eq!(ls.current(), format!("{TURTLE_SYMBOLS}?"));
        assert_eq!(ls.generation(), 3);
    }

    #[test]
    fn basic_tree_first_generation() {
        let mut ls = LSystem::new(RuleSet::basic());
        assert_eq!(ls.current(), "A");
        ls.step(&mut rng());
        assert_eq!(ls.current(), A_RULE);
    }

    #[test]
    fn basic_tree_second_generation_rewrites_every_symbol() {
        let mut ls = LSystem::new(RuleSet::basic());
        ls.run(2, &mut rng());

        let expected: String = A_RULE
            .chars()
            .map(|c| match c {
                'A' => A_RULE.to_string(),
                'F' => "S/////F".to_string(),
                'L' => "[^^T]".to_string(),
                other => other.to_string(),
            })
            .collect();
        assert_eq!(ls.current(), expected);
    }

    #[test]
    fn reset_returns_to_axiom() {
        let mut ls = LSystem::new(RuleSet::basic());
        ls.run(3, &mut rng());
        ls.reset();
        assert_eq!(ls.current(), "A");
        assert_eq!(ls.generation(), 0);
    }

    #[test]
    fn uniform_mode_reaches_every_production() {
        let mut rules = RuleSet {
            axiom: "X".to_string(),
            ..RuleSet::empty()
        };
        rules.add_production('X', "a", 1.0);
        rules.add_production('X', "b", 1.0);
        rules.add_production('X', "c", 1.0);
        assert_eq!(rules.rules.len(), 1);

        let mut seen = std::collections::HashSet::new();
        let mut r = rng();
        for _ in 0..100 {
            let mut ls = LSystem::new(rules.clone());
            ls.step(&mut r);
            seen.insert(ls.current().to_string());
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn threshold_mode_falls_through_to_identity() {
        let mut never = RuleSet {
            axiom: "XXXX".to_string(),
            mode: SelectionMode::Threshold,
            ..RuleSet::empty()
        };
        never.add_production('X', "Y", 0.0);
        let mut ls = LSystem::new(never);
        ls.run(4, &mut rng());
        assert_eq!(ls.current(), "XXXX");

        let mut always = RuleSet {
            axiom: "XXXX".to_string(),
            mode: SelectionMode::Threshold,
            ..RuleSet::empty()
        };
        always.add_production('X', "Y", 1.0);
        let mut ls = LSystem::new(always);
        ls.step(&mut rng());
        assert_eq!(ls.current(), "YYYY");
    }

    #[test]
    fn weighted_mode_skips_zero_weight() {
        let mut rules = RuleSet {
            axiom: "X".repeat(50),
            mode: SelectionMode::Weighted,
            ..RuleSet::empty()
        };
        rules.add_production('X', "a", 0.0);
        rules.add_production('X', "b", 2.0);
        let mut ls = LSystem::new(rules);
        ls.step(&mut rng());
        assert_eq!(ls.current(), "b".repeat(50));
    }

    #[test]
    fn weighted_mode_all_zero_keeps_symbol() {
        let mut rules = RuleSet {
            axiom: "XX".to_string(),
            mode: SelectionMode::Weighted,
            ..RuleSet::empty()
        };
        rules.add_production('X', "a", 0.0);
        let mut ls = LSystem::new(rules);
        ls.step(&mut rng());
        assert_eq!(ls.current(), "XX");
    }

    #[test]
    fn same_seed_same_tree() {
        let mut rules = RuleSet::basic();
        rules.add_production('F', "F[+F]", 1.0);
        let mut a = LSystem::new(rules.clone());
        let mut b = LSystem::new(rules);
        a.run(4, &mut StdRng::seed_from_u64(8));
        b.run(4, &mut StdRng::seed_from_u64(8));
        assert_eq!(a.skeleton(), b.skeleton());
    }

    #[test]
    #[should_panic]
    fn empty_rule_is_a_programmer_error() {
        let rules = RuleSet {
            axiom: "X".to_string(),
            rules: vec![Rule {
                symbol: 'X',
                productions: Vec::new(),
            }],
            ..RuleSet::empty()
        };
        LSystem::new(rules).step(&mut rng());
    }
}
