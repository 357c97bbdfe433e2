use std::sync::Arc;

use crate::riddle::RiddleError;

/// A multiple-choice question. The correct index always points into `answers`.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    text: Arc<str>,
    answers: Arc<[String]>,
    correct_index: usize,
}

impl Question {
    pub fn new(
        text: impl AsRef<str>,
        answers: Vec<String>,
        correct_index: usize,
    ) -> Result<Self, RiddleError> {
        if answers.len() < 2 {
            return Err(RiddleError::InvalidQuestion(format!(
                "needs at least 2 answers, got {}",
                answers.len()
            )));
        }

        if correct_index >= answers.len() {
            return Err(RiddleError::InvalidQuestion(format!(
                "correct index {} out of range for {} answers",
                correct_index,
                answers.len()
            )));
        }

        Ok(Self {
            text: text.as_ref().into(),
            answers: answers.into(),
            correct_index,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    pub fn is_correct(&self, index: usize) -> bool {
        index == self.correct_index
    }
}

/// Supplies the question attached to each generated waypoint.
pub trait QuestionSource {
    fn next_question(&mut self) -> Question;
}

impl<F> QuestionSource for F
where
    F: FnMut() -> Question,
{
    fn next_question(&mut self) -> Question {
        (self)()
    }
}

/// Hands out the same question every time.
#[derive(Clone, Debug)]
pub struct FixedQuestion(pub Question);

impl FixedQuestion {
    /// The demo question used when nothing else is configured.
    pub fn demo() -> Self {
        let answers = ["Paris", "Lyon", "Marseille", "Nice"]
            .into_iter()
            .map(String::from)
            .collect();

        Self(Question {
            text: "What is the capital of France?".into(),
            answers,
            correct_index: 0,
        })
    }
}

impl Default for FixedQuestion {
    fn default() -> Self {
        Self::demo()
    }
}

impl QuestionSource for FixedQuestion {
    fn next_question(&mut self) -> Question {
        self.0.clone()
    }
}

/// Cycles through a fixed list of questions in order.
#[derive(Clone, Debug)]
pub struct QuestionPool {
    questions: Vec<Question>,
    cursor: usize,
}

impl QuestionPool {
    pub fn new(questions: Vec<Question>) -> Result<Self, RiddleError> {
        if questions.is_empty() {
            return Err(RiddleError::InvalidArgument(
                "question pool must not be empty".into(),
            ));
        }

        Ok(Self {
            questions,
            cursor: 0,
        })
    }
}

impl QuestionSource for QuestionPool {
    fn next_question(&mut self) -> Question {
        let question = self.questions[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.questions.len();
        question
    }
}
