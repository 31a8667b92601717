use super::Declaration;
use crate::model::QnaKb;

/// `$word:qna-alterations=` plus one alternate spelling per body line.
/// The header word leads the list.
pub(super) fn add_alterations(kb: &mut QnaKb, decl: &Declaration) {
    let mut words = vec![decl.name.to_owned()];
    for line in decl.lines {
        let word = line.text.trim();
        if !word.is_empty() && !words.iter().any(|w| w == word) {
            words.push(word.to_owned());
        }
    }
    kb.word_alterations.push(words);
}

#[cfg(test)]
mod tests {
    use crate::config::ParseOptions;
    use crate::error::Warnings;
    use crate::lexer;
    use crate::model::{LuisApp, QnaKb};
    use crate::parser;

    #[test]
    fn alterations_go_to_the_knowledge_base() {
        let resource = parser::parse(
            &lexer::lex("$botframework:qna-alterations=\n- bot framework\n- Microsoft bot framework\n"),
            "a.qna",
        );
        let mut app = LuisApp::new();
        let mut kb = QnaKb::default();
        let options = ParseOptions::default();
        let ctx = super::super::MergeContext {
            locale: "en-us",
            options: &options,
        };
        super::super::merge(&resource.sections, &mut app, &mut kb, &ctx, &mut Warnings::new(false))
            .unwrap();
        assert_eq!(
            kb.word_alterations,
            vec![vec![
                "botframework".to_owned(),
                "bot framework".to_owned(),
                "Microsoft bot framework".to_owned()
            ]]
        );
        assert!(app.registry.is_empty());
    }
}
