//! Prompt builders for question generation and answer evaluation.
//!
//! The JSON templates embedded here are the contract the normalizer and the
//! defaulting logic are written against; change them together.

use crate::interview::questions::{QuestionCategory, QuestionRecord};

pub fn question_set_prompt(
    job_position: &str,
    job_description: &str,
    years_experience: u32,
    question_count: usize,
) -> String {
    format!(
        r#"You are an expert technical interviewer with deep knowledge of software engineering, system design, and behavioral assessment.

Generate a comprehensive set of interview questions for a {job_position} position with {years_experience} years of experience.

Tech Stack: {job_description}

Please provide exactly {question_count} questions in the following JSON format:

[
  {{
    "question": "Detailed question text here",
    "answer": "Comprehensive expected answer with key points, examples, and best practices",
    "category": "technical|system_design|behavioral|problem_solving",
    "difficulty": "junior|mid|senior",
    "keyPoints": ["Key point 1", "Key point 2", "Key point 3"],
    "scoringCriteria": {{
      "excellent": "9-10 points: Demonstrates deep understanding, provides specific examples, shows best practices",
      "good": "7-8 points: Shows solid understanding, provides some examples, mostly correct approach",
      "average": "5-6 points: Basic understanding, limited examples, some gaps in knowledge",
      "poor": "1-4 points: Limited understanding, no examples, significant knowledge gaps"
    }}
  }}
]

Guidelines:
- Questions should be appropriate for {years_experience} years of experience
- Include a mix of technical depth, practical application, and problem-solving
- For technical questions, focus on {job_description} and relevant technologies
- Behavioral questions should assess soft skills relevant to the role
- System design questions should match the experience level
- Each question should have clear, detailed expected answers
- Scoring criteria should be specific and actionable

Ensure the response is valid JSON without any markdown formatting."#
    )
}

pub fn single_question_prompt(
    job_position: &str,
    job_description: &str,
    years_experience: u32,
    category: QuestionCategory,
) -> String {
    let category = category.as_str();
    format!(
        r#"Generate a single {category} interview question for a {job_position} position with {years_experience} years of experience.

Tech Stack: {job_description}

Provide the response in this JSON format:

{{
  "question": "Detailed question text",
  "answer": "Comprehensive expected answer",
  "category": "{category}",
  "difficulty": "junior|mid|senior",
  "keyPoints": ["Key point 1", "Key point 2", "Key point 3"],
  "scoringCriteria": {{
    "excellent": "9-10 points: Exceptional understanding",
    "good": "7-8 points: Strong understanding",
    "average": "5-6 points: Adequate understanding",
    "poor": "1-4 points: Limited understanding"
  }}
}}"#
    )
}

pub fn evaluation_prompt(question: &QuestionRecord, user_answer: &str) -> String {
    format!(
        r#"You are an expert technical interviewer evaluating a candidate's response.

Question: {question}
Expected Answer: {expected}
Candidate's Answer: {user_answer}
Question Category: {category}
Difficulty Level: {difficulty}

Please evaluate this response and provide feedback in the following JSON format (ensure it's valid JSON without markdown):

{{
  "rating": [number between 1-10],
  "feedback": "Detailed, constructive feedback explaining the score and areas for improvement",
  "strengths": ["Strength 1", "Strength 2", "Strength 3"],
  "areasForImprovement": ["Area 1", "Area 2", "Area 3"],
  "specificSuggestions": ["Suggestion 1", "Suggestion 2", "Suggestion 3"],
  "technicalAccuracy": [number between 1-10],
  "communication": [number between 1-10],
  "problemSolving": [number between 1-10],
  "overallAssessment": "Summary of performance and recommendations"
}}

Scoring Guidelines:
- 9-10: Exceptional understanding, excellent examples, demonstrates best practices
- 7-8: Strong understanding, good examples, shows good practices
- 5-6: Adequate understanding, some examples, basic practices
- 3-4: Limited understanding, few examples, gaps in knowledge
- 1-2: Poor understanding, no examples, significant knowledge gaps

Focus on:
- Technical accuracy and depth
- Practical examples and real-world application
- Problem-solving approach and methodology
- Communication clarity and structure
- Alignment with industry best practices

Provide specific, actionable feedback that helps the candidate improve."#,
        question = question.question,
        expected = question.answer,
        user_answer = user_answer,
        category = question.category.as_str(),
        difficulty = question.difficulty.as_str(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::questions::Difficulty;

    #[test]
    fn test_question_set_prompt_embeds_inputs() {
        let prompt = question_set_prompt("Backend Engineer", "Go, Postgres", 3, 5);
        assert!(prompt.contains("Backend Engineer"));
        assert!(prompt.contains("Go, Postgres"));
        assert!(prompt.contains("exactly 5 questions"));
        assert!(prompt.contains("\"keyPoints\""));
    }

    #[test]
    fn test_evaluation_prompt_embeds_question_and_answer() {
        let question = QuestionRecord {
            question: "Explain ownership in Rust".to_string(),
            answer: "Each value has a single owner".to_string(),
            category: QuestionCategory::Technical,
            difficulty: Difficulty::Mid,
            key_points: vec!["moves".to_string()],
            scoring_criteria: Default::default(),
        };
        let prompt = evaluation_prompt(&question, "Ownership means one owner per value");
        assert!(prompt.contains("Explain ownership in Rust"));
        assert!(prompt.contains("Ownership means one owner per value"));
        assert!(prompt.contains("Question Category: technical"));
        assert!(prompt.contains("Difficulty Level: mid"));
    }
}
