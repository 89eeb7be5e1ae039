//! # Question Building Tests
//!
//! Exercises the OCR text slicing on screen captures the way they come back
//! from text detection.

#[cfg(test)]
mod tests {
    use quizlens::question::{is_selection_question, Question};
    use quizlens::question_patterns::{ANSWER_INSTRUCTION, CONCISE_INSTRUCTION};

    const SCREEN_TEXT: &str = "12:45\n4G\n78%\nQual destes escritores\nganhou o Nobel da\nLiteratura?\nJosé Saramago\nEça de Queirós\nFernando Pessoa\nLuís de Camões\nDr.Why Quiz\nPublicidade";

    /// Test a full phone screenshot: noise, wrapped stem, watermark
    #[test]
    fn test_realistic_screen() {
        let question = Question::from_ocr_text(SCREEN_TEXT, None).unwrap();

        assert_eq!(question.stem, "Qual destes escritores ganhou o Nobel da Literatura?");
        assert_eq!(
            question.options,
            vec![
                "A) José Saramago",
                "B) Eça de Queirós",
                "C) Fernando Pessoa",
                "D) Luís de Camões",
            ]
        );
        assert_eq!(
            question.prompt,
            format!(
                "Qual destes escritores ganhou o Nobel da Literatura?\nA) José Saramago\nB) Eça de Queirós\nC) Fernando Pessoa\nD) Luís de Camões\n{}",
                ANSWER_INSTRUCTION
            )
        );
    }

    /// Test the chat note goes after the instruction
    #[test]
    fn test_suffix_is_appended() {
        let question = Question::from_ocr_text(SCREEN_TEXT, Some("Responde em inglês.")).unwrap();
        assert!(question
            .prompt
            .ends_with(&format!("{}\nResponde em inglês.", ANSWER_INSTRUCTION)));

        let blank = Question::from_ocr_text(SCREEN_TEXT, Some("   ")).unwrap();
        assert!(blank.prompt.ends_with(ANSWER_INSTRUCTION));
    }

    /// Test the concise prompt only carries the stem
    #[test]
    fn test_concise_prompt_ignores_options_and_suffix() {
        let question = Question::from_ocr_text(SCREEN_TEXT, Some("Responde em inglês.")).unwrap();
        assert_eq!(
            question.concise_prompt(),
            format!("Qual destes escritores ganhou o Nobel da Literatura?\n{}", CONCISE_INSTRUCTION)
        );
    }

    /// Test at most five short leading lines are dropped
    #[test]
    fn test_noise_limit() {
        let text = "1\n2\n3\n4\n5\n6\nQuanto é 2+2?\n3\n4";
        let question = Question::from_ocr_text(text, None).unwrap();

        // the sixth short line survives and becomes the stem
        assert_eq!(question.stem, "6 Quanto é 2+2?");
        assert_eq!(question.options, vec!["A) 3", "B) 4"]);
    }

    /// Test a question mark further down does not pull options into the stem
    #[test]
    fn test_question_mark_outside_search_window() {
        let text = "Complete a frase\nO rio que passa em Lisboa\nchama-se\nTejo?\nDouro";
        let question = Question::from_ocr_text(text, None).unwrap();

        assert_eq!(question.stem, "Complete a frase");
        assert_eq!(
            question.options,
            vec!["A) O rio que passa em Lisboa", "B) chama-se", "C) Tejo?", "D) Douro"]
        );
    }

    /// Test a stem without any question mark stays on its line
    #[test]
    fn test_stem_without_question_mark() {
        let question = Question::from_ocr_text("Capital de Portugal\nLisboa\nPorto", None).unwrap();

        assert_eq!(question.stem, "Capital de Portugal");
        assert_eq!(question.options, vec!["A) Lisboa", "B) Porto"]);
    }

    /// Test only the first five options get a letter
    #[test]
    fn test_more_than_five_options() {
        let text = "Qual é um número primo?\n4\n6\n8\n9\n10\n11";
        let question = Question::from_ocr_text(text, None).unwrap();

        assert_eq!(
            question.options,
            vec!["A) 4", "B) 6", "C) 8", "D) 9", "E) 10", "11"]
        );
    }

    /// Test the alternative watermark spelling is cut as well
    #[test]
    fn test_watermark_variant() {
        let text = "Qual é o maior oceano?\nAtlântico\nPacífico\nDe:Why\nÍndico";
        let question = Question::from_ocr_text(text, None).unwrap();

        assert_eq!(question.options, vec!["A) Atlântico", "B) Pacífico"]);
        assert!(!question.prompt.contains("Índico"));
    }

    /// Test callers can swap the answer instruction
    #[test]
    fn test_custom_instruction() {
        let question =
            Question::with_instruction("Quanto é 3x3?\n6\n9", Some("Explica."), "Answer with the letter.")
                .unwrap();

        assert_eq!(question.prompt, "Quanto é 3x3?\nA) 6\nB) 9\nAnswer with the letter.\nExplica.");
    }

    /// Test "which of the following" detection
    #[test]
    fn test_selection_detection() {
        assert!(is_selection_question("QUAL DOS SEGUINTES É UM RIO?"));
        assert!(is_selection_question("QUAL DAS  SEGUINTES CIDADES FICA NO NORTE?"));
        assert!(is_selection_question("QUAL DESTES ANIMAIS É UM MAMÍFERO?"));
        assert!(!is_selection_question("QUEM ESCREVEU OS LUSÍADAS?"));

        let question = Question::from_ocr_text("QUAL DESTES É UM PLANETA?\nMarte\nSol", None).unwrap();
        assert!(question.is_selection());
        assert!(!Question::from_ocr_text(SCREEN_TEXT, None).unwrap().is_selection());
    }

    /// Test a stem-only text still yields a prompt
    #[test]
    fn test_stem_only() {
        let question = Question::from_ocr_text("Em que ano caiu o muro de Berlim?", None).unwrap();

        assert!(question.options.is_empty());
        assert_eq!(
            question.prompt,
            format!("Em que ano caiu o muro de Berlim?\n{}", ANSWER_INSTRUCTION)
        );
    }
}
