use clap::ValueEnum;
use rand::Rng;
use std::collections::HashSet;

/// Widest operand supported; two 9-digit operands still multiply within `u64`.
pub const MAX_DIGITS: u32 = 9;

/// Attempts allowed per requested question before a batch gives up.
const ATTEMPTS_PER_QUESTION: usize = 100;

/// Upper bound on up-front buffer reservation for a batch.
const MAX_PREALLOC: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, strum_macros::Display)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Addition,
        Operation::Subtraction,
        Operation::Multiplication,
        Operation::Division,
    ];

    pub fn glyph(&self) -> &'static str {
        match self {
            Operation::Addition => "+",
            Operation::Subtraction => "-",
            Operation::Multiplication => "×",
            Operation::Division => "÷",
        }
    }

    /// The operation after this one, wrapping around.
    pub fn next(&self) -> Self {
        let idx = Self::ALL.iter().position(|op| op == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        let idx = Self::ALL.iter().position(|op| op == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// A single drill question. The rendered expression is the record of which
/// operands were drawn; only `time_spent_secs` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub expression: String,
    pub correct_answer: u64,
    pub time_spent_secs: u64,
}

impl Question {
    fn render(lhs: u64, op: Operation, rhs: u64, correct_answer: u64) -> Self {
        Self {
            expression: format!("{lhs} {} {rhs}", op.glyph()),
            correct_answer,
            time_spent_secs: 0,
        }
    }

    /// Parse the two operands back out of the rendered expression.
    pub fn operands(&self) -> Option<(u64, u64)> {
        let mut parts = self.expression.split_whitespace();
        let lhs = parts.next()?.parse().ok()?;
        let _op = parts.next()?;
        let rhs = parts.next()?.parse().ok()?;
        match parts.next() {
            None => Some((lhs, rhs)),
            Some(_) => None,
        }
    }
}

/// Inclusive operand range for a digit width: `[10^(d-1), 10^d - 1]`.
pub fn operand_range(digit_count: u32) -> (u64, u64) {
    let digits = digit_count.clamp(1, MAX_DIGITS);
    (10u64.pow(digits - 1), 10u64.pow(digits) - 1)
}

fn random_operand<R: Rng + ?Sized>(rng: &mut R, digit_count: u32) -> u64 {
    let (min, max) = operand_range(digit_count);
    rng.gen_range(min..=max)
}

pub fn generate_one(operation: Operation, digit_count: u32) -> Question {
    generate_one_with(&mut rand::thread_rng(), operation, digit_count)
}

pub fn generate_one_with<R: Rng + ?Sized>(
    rng: &mut R,
    operation: Operation,
    digit_count: u32,
) -> Question {
    let a = random_operand(rng, digit_count);
    let b = random_operand(rng, digit_count);

    match operation {
        Operation::Addition => Question::render(a, operation, b, a + b),
        Operation::Subtraction => {
            let (a, b) = if b > a { (b, a) } else { (a, b) };
            Question::render(a, operation, b, a - b)
        }
        Operation::Multiplication => Question::render(a, operation, b, a * b),
        Operation::Division => {
            let divisor = match random_operand(rng, digit_count) {
                0 => 1,
                d => d,
            };
            let quotient = random_operand(rng, 1);
            Question::render(divisor * quotient, operation, divisor, quotient)
        }
    }
}

/// Key used to reject duplicates within a batch. Multiplication is
/// commutative so its operands are sorted; every other operation keys on
/// the rendered text.
pub fn canonical_key(operation: Operation, question: &Question) -> String {
    if operation == Operation::Multiplication {
        if let Some((lhs, rhs)) = question.operands() {
            let (lo, hi) = if lhs <= rhs { (lhs, rhs) } else { (rhs, lhs) };
            return format!("{lo}×{hi}");
        }
    }
    question.expression.clone()
}

/// Number of distinct questions (by `canonical_key`) an operation can
/// produce at a digit width.
pub fn question_space(operation: Operation, digit_count: u32) -> u128 {
    let (min, max) = operand_range(digit_count);
    let n = (max - min + 1) as u128;
    match operation {
        Operation::Addition => n * n,
        Operation::Subtraction | Operation::Multiplication => n * (n + 1) / 2,
        Operation::Division => {
            let (qmin, qmax) = operand_range(1);
            n * (qmax - qmin + 1) as u128
        }
    }
}

pub fn generate_many(operation: Operation, digit_count: u32, count: usize) -> Vec<Question> {
    generate_many_with(&mut rand::thread_rng(), operation, digit_count, count)
}

/// Generate up to `count` unique questions. The operand space for narrow
/// widths can be smaller than `count`; once `count * 100` draws are spent
/// the unique questions found so far are returned. Generation also stops
/// once every distinct question has been drawn.
pub fn generate_many_with<R: Rng + ?Sized>(
    rng: &mut R,
    operation: Operation,
    digit_count: u32,
    count: usize,
) -> Vec<Question> {
    let target = usize::try_from(question_space(operation, digit_count))
        .map_or(count, |space| count.min(space));
    let mut questions = Vec::with_capacity(target.min(MAX_PREALLOC));
    let mut seen = HashSet::with_capacity(target.min(MAX_PREALLOC));
    let max_attempts = count.saturating_mul(ATTEMPTS_PER_QUESTION);
    let mut attempts = 0;

    while questions.len() < target && attempts < max_attempts {
        attempts += 1;
        let question = generate_one_with(rng, operation, digit_count);
        if seen.insert(canonical_key(operation, &question)) {
            questions.push(question);
        }
    }

    if questions.len() < count {
        tracing::debug!(
            %operation,
            digit_count,
            requested = count,
            generated = questions.len(),
            attempts,
            "question space exhausted"
        );
    }

    questions
}
