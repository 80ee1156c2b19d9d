use crate::dataset::{Question, OPTION_LETTERS};

/// Builds the instruction prompt for one question.
///
/// The wording is fixed so runs across models and temperatures are comparable.
pub fn build_prompt(question: &Question) -> String {
    let mut prompt = String::from(
        "Responda a questão a seguir, usando apenas seus conhecimentos, sem acessar a internet. \
         A resposta deve ser somente a letra correspondente à alternativa correta.\n---\n",
    );
    prompt.push_str(&format!("Questão: {}\n", question.text));
    for (letter, option) in OPTION_LETTERS.iter().zip(&question.options) {
        prompt.push_str(&format!("{letter}) {option}\n"));
    }
    prompt.push_str(
        "\nResponda apenas com uma letra, a letra da alternativa correta (A, B, C, D, E).\n\n\
         ---\nExemplo de resposta 1: A\nExemplo de resposta 2: D",
    );
    prompt
}
