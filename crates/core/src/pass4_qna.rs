//! Pass 4: QnA pairs → knowledge-base entries.

use crate::ast::Section;
use crate::model::{QnaKb, QnaPair, DEFAULT_QNA_SOURCE};

pub fn build_qna(sections: &[Section], kb: &mut QnaKb) {
    for section in sections {
        let Section::Qna(qna) = section else {
            continue;
        };
        let mut questions: Vec<String> = Vec::new();
        for q in &qna.questions {
            let q = q.trim();
            if !q.is_empty() && !questions.iter().any(|existing| existing == q) {
                questions.push(q.to_owned());
            }
        }
        kb.qna_list.push(QnaPair {
            id: 0,
            answer: qna.answer.clone(),
            source: DEFAULT_QNA_SOURCE.to_owned(),
            questions,
            metadata: qna.filters.clone(),
        });
    }
}
