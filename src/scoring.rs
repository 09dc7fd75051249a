use crate::question::Question;
use crate::util::mean;

/// An answer is correct when it is non-blank and numerically equal to the
/// expected value, so `"42.0"` and `" 42 "` both match 42.
pub fn check_answer(input: &str, correct_answer: u64) -> bool {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return false;
    }
    if let Ok(n) = trimmed.parse::<u64>() {
        return n == correct_answer;
    }
    match trimmed.parse::<f64>() {
        Ok(n) => n == correct_answer as f64,
        Err(_) => false,
    }
}

/// Count correct answers. Answers without a matching question are skipped.
pub fn calculate_score<S: AsRef<str>>(answers: &[S], questions: &[Question]) -> usize {
    answers
        .iter()
        .zip(questions)
        .filter(|(answer, question)| check_answer(answer.as_ref(), question.correct_answer))
        .count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerStatus {
    Unanswered,
    Correct,
    Incorrect,
}

impl AnswerStatus {
    pub fn of(answer: &str, correct_answer: u64) -> Self {
        if answer.trim().is_empty() {
            AnswerStatus::Unanswered
        } else if check_answer(answer, correct_answer) {
            AnswerStatus::Correct
        } else {
            AnswerStatus::Incorrect
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnswerStatus::Unanswered => "Unanswered",
            AnswerStatus::Correct => "Correct",
            AnswerStatus::Incorrect => "Incorrect",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewItem {
    pub number: usize,
    pub expression: String,
    pub answer: String,
    pub correct_answer: u64,
    pub status: AnswerStatus,
    pub time_spent_secs: u64,
}

/// Post-attempt breakdown shown on the results screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    pub unanswered: usize,
    pub percentage: u32,
    pub items: Vec<ReviewItem>,
}

impl Review {
    pub fn new<S: AsRef<str>>(answers: &[S], questions: &[Question]) -> Self {
        let items: Vec<ReviewItem> = questions
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let answer = answers.get(idx).map(|a| a.as_ref()).unwrap_or("");
                ReviewItem {
                    number: idx + 1,
                    expression: q.expression.clone(),
                    answer: answer.to_string(),
                    correct_answer: q.correct_answer,
                    status: AnswerStatus::of(answer, q.correct_answer),
                    time_spent_secs: q.time_spent_secs,
                }
            })
            .collect();

        let total = items.len();
        let correct = calculate_score(answers, questions);
        let unanswered = items
            .iter()
            .filter(|i| i.status == AnswerStatus::Unanswered)
            .count();
        let answered = total - unanswered;
        let percentage = if total == 0 {
            0
        } else {
            ((correct as f64 / total as f64) * 100.0).round() as u32
        };

        Self {
            total,
            correct,
            wrong: answered.saturating_sub(correct),
            unanswered,
            percentage,
            items,
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }

    /// Mean seconds recorded per question.
    pub fn mean_time_secs(&self) -> Option<f64> {
        let times: Vec<f64> = self
            .items
            .iter()
            .map(|i| i.time_spent_secs as f64)
            .collect();
        mean(&times)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(correct_answer: u64) -> Question {
        Question {
            expression: format!("{correct_answer} + 0"),
            correct_answer,
            time_spent_secs: 0,
        }
    }

    #[test]
    fn test_check_answer() {
        assert!(check_answer("42", 42));
        assert!(check_answer("42.0", 42));
        assert!(check_answer(" 42 ", 42));
        assert!(!check_answer("", 42));
        assert!(!check_answer(" ", 42));
        assert!(!check_answer("41", 42));
        assert!(!check_answer("abc", 42));
        assert!(check_answer("0", 0));
    }

    #[test]
    fn test_calculate_score() {
        assert_eq!(calculate_score(&["2", "4", "5"], &[q(2), q(4), q(6)]), 2);
    }

    #[test]
    fn test_calculate_score_empty_counts_wrong() {
        assert_eq!(calculate_score(&["2", ""], &[q(2), q(4)]), 1);
    }

    #[test]
    fn test_calculate_score_skips_missing_questions() {
        assert_eq!(calculate_score(&["2", "4", "9"], &[q(2), q(4)]), 2);
        let none: [&str; 0] = [];
        assert_eq!(calculate_score(&none, &[q(1)]), 0);
    }

    #[test]
    fn test_answer_status() {
        assert_eq!(AnswerStatus::of("", 3), AnswerStatus::Unanswered);
        assert_eq!(AnswerStatus::of("3", 3), AnswerStatus::Correct);
        assert_eq!(AnswerStatus::of("4", 3), AnswerStatus::Incorrect);
        assert_eq!(AnswerStatus::Incorrect.label(), "Incorrect");
    }

    #[test]
    fn test_review_breakdown() {
        let mut questions = vec![q(2), q(4), q(6), q(8)];
        questions[0].time_spent_secs = 3;
        questions[1].time_spent_secs = 5;
        let answers = ["2", "5", "", "8"];

        let review = Review::new(&answers, &questions);

        assert_eq!(review.total, 4);
        assert_eq!(review.correct, 2);
        assert_eq!(review.wrong, 1);
        assert_eq!(review.unanswered, 1);
        assert_eq!(review.percentage, 50);
        assert!(!review.is_perfect());
        assert_eq!(review.items[1].status, AnswerStatus::Incorrect);
        assert_eq!(review.items[2].status, AnswerStatus::Unanswered);
        assert_eq!(review.items[3].number, 4);
        assert_eq!(review.mean_time_secs(), Some(2.0));
    }

    #[test]
    fn test_review_rounds_percentage() {
        let review = Review::new(&["1", "", ""], &[q(1), q(2), q(3)]);
        assert_eq!(review.percentage, 33);
        let review = Review::new(&["1", "2", ""], &[q(1), q(2), q(3)]);
        assert_eq!(review.percentage, 67);
    }

    #[test]
    fn test_review_perfect() {
        let review = Review::new(&["1", "2"], &[q(1), q(2)]);
        assert!(review.is_perfect());
    }

    #[test]
    fn test_review_empty() {
        let none: [&str; 0] = [];
        let review = Review::new(&none, &[]);
        assert_eq!(review.percentage, 0);
        assert_eq!(review.mean_time_secs(), None);
    }
}
