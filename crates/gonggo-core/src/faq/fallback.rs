//! Local answers used when the FAQ model cannot answer.
//!
//! Rules are tried in order. A rule fires when its question pattern matches
//! and, if it has one, its document pattern matches the document text. The
//! template gets `{title}` and `{excerpt}`: among the sentences the document
//! pattern matches, the one sharing the most keywords with the question.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use super::context::truncate_chars;

const EXCERPT_CAP: usize = 300;

const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "can", "do", "does", "for", "get", "how", "in", "is", "it", "many",
    "much", "my", "of", "on", "or", "the", "to", "what", "when", "where", "which", "who", "why",
];

#[derive(Debug, Clone)]
pub struct FallbackRule {
    pub name: String,
    pub question: Regex,
    pub document: Option<Regex>,
    pub template: String,
}

impl FallbackRule {
    /// # Errors
    ///
    /// Returns an error if either pattern is not a valid regex.
    pub fn new(
        name: &str,
        question: &str,
        document: Option<&str>,
        template: &str,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.to_owned(),
            question: Regex::new(question)?,
            document: document.map(Regex::new).transpose()?,
            template: template.to_owned(),
        })
    }

    fn matches(&self, question: &str, document: &str) -> bool {
        self.question.is_match(question)
            && self.document.as_ref().is_none_or(|re| re.is_match(document))
    }
}

const BUILTIN_RULES: &[(&str, &str, &str, &str)] = &[
    (
        "application",
        r"(?i)신청|접수|apply|application|register",
        r"(?i)신청|접수|방문|온라인|apply|application|online|visit",
        "To apply for {title}: {excerpt}",
    ),
    (
        "eligibility",
        r"(?i)대상|자격|누가|누구|eligib|who can|qualif",
        r"(?i)대상|자격|거주|만\s*\d+\s*세|eligib|resident|applicant|aged?\b",
        "Eligibility for {title}: {excerpt}",
    ),
    (
        "period",
        r"(?i)기간|기한|마감|언제|날짜|deadline|when|period|until",
        r"(?i)\d{1,2}\s*월|\d{1,2}\s*일|\d{4}[./-]\s*\d{1,2}|까지|기간|deadline|until|\bby\b|period",
        "Schedule for {title}: {excerpt}",
    ),
    (
        "amount",
        r"(?i)금액|얼마|지원금|혜택|amount|how much|benefit|cost|fee",
        r"(?i)\d[\d,]*\s*(원|만\s*원|won|dollars?)|\$\s*\d|금액|지원금|혜택|amount|benefit",
        "Amounts and benefits of {title}: {excerpt}",
    ),
    (
        "contact",
        r"(?i)문의|연락|전화|contact|phone|e-?mail|inquir",
        r"(?i)\d{2,4}-\d{3,4}-\d{4}|문의|연락|전화|contact|phone|@",
        "For inquiries about {title}: {excerpt}",
    ),
    (
        "documents",
        r"(?i)서류|준비물|제출|documents?|paperwork|bring",
        r"(?i)서류|신분증|증명서|제출|documents?|certificate|\bid\b",
        "Documents required for {title}: {excerpt}",
    ),
];

static DEFAULT_RULES: LazyLock<Vec<FallbackRule>> = LazyLock::new(|| {
    BUILTIN_RULES
        .iter()
        .map(|(name, question, document, template)| {
            FallbackRule::new(name, question, Some(document), template).unwrap()
        })
        .collect()
});

/// Ordered rule set with a keyword-overlap generic answer as the last resort.
#[derive(Debug, Clone)]
pub struct FallbackRules {
    rules: Vec<FallbackRule>,
}

impl Default for FallbackRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.clone(),
        }
    }
}

impl FallbackRules {
    #[must_use]
    pub fn new(rules: Vec<FallbackRule>) -> Self {
        Self { rules }
    }

    #[must_use]
    pub fn rules(&self) -> &[FallbackRule] {
        &self.rules
    }

    /// First rule that fires, `None` for the generic answer.
    #[must_use]
    pub fn matching_rule(&self, question: &str, document: &str) -> Option<&FallbackRule> {
        self.rules.iter().find(|r| r.matches(question, document))
    }

    #[must_use]
    pub fn answer(&self, question: &str, title: &str, document: &str) -> String {
        let sentences = split_sentences(document);
        let keywords = keywords(question);

        if let Some(rule) = self.matching_rule(question, document) {
            let evidence = |s: &str| rule.document.as_ref().map_or(0, |re| re.find_iter(s).count());
            let best = best_by(&sentences, |s| (evidence(s) > 0, overlap(s, &keywords), evidence(s)));
            if let Some(excerpt) = best {
                tracing::debug!(rule = %rule.name, "fallback rule matched");
                return render(&rule.template, title, excerpt);
            }
        }

        let overlapping = best_by(&sentences, |s| overlap(s, &keywords))
            .filter(|s| overlap(s, &keywords) > 0)
            .or_else(|| sentences.first().copied());
        match overlapping {
            Some(excerpt) => render("According to {title}: {excerpt}", title, excerpt),
            None => format!(
                "An answer could not be generated. Please check the original document \"{title}\"."
            ),
        }
    }
}

fn render(template: &str, title: &str, excerpt: &str) -> String {
    template
        .replace("{title}", title)
        .replace("{excerpt}", truncate_chars(excerpt, EXCERPT_CAP))
}

fn split_sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|s| s.chars().filter(|c| c.is_alphanumeric()).count() >= 2)
        .collect()
}

fn keywords(question: &str) -> HashSet<String> {
    question
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() >= 2 && !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn overlap(sentence: &str, keywords: &HashSet<String>) -> usize {
    let lower = sentence.to_lowercase();
    keywords.iter().filter(|k| lower.contains(k.as_str())).count()
}

/// Highest-scoring sentence; the earliest wins ties.
fn best_by<'a, K: Ord>(sentences: &[&'a str], score: impl Fn(&str) -> K) -> Option<&'a str> {
    let mut best: Option<(&str, K)> = None;
    for &s in sentences {
        let key = score(s);
        if best.as_ref().is_none_or(|(_, top)| key > *top) {
            best = Some((s, key));
        }
    }
    best.map(|(s, _)| s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "The city offers a consumption coupon to residents. \
        Residents aged 19 or older are eligible. \
        Applications are accepted online or by visiting a community center. \
        The application period runs until May 31. \
        Each person receives 150,000 won. \
        For questions call 02-120-1234.";

    #[test]
    fn builtin_rules_compile() {
        assert_eq!(FallbackRules::default().rules().len(), BUILTIN_RULES.len());
    }

    #[test]
    fn deadline_question_uses_period_rule() {
        let rules = FallbackRules::default();
        let answer = rules.answer("When is the deadline?", "Coupon", DOC);
        assert!(answer.starts_with("Schedule for Coupon:"), "{answer}");
        assert!(answer.contains("May 31"));
    }

    #[test]
    fn amount_question_quotes_amount() {
        let answer = FallbackRules::default().answer("How much money do I get?", "Coupon", DOC);
        assert!(answer.contains("150,000 won"), "{answer}");
    }

    #[test]
    fn contact_question_quotes_phone() {
        let answer = FallbackRules::default().answer("Which phone number can I contact?", "Coupon", DOC);
        assert!(answer.contains("02-120-1234"), "{answer}");
    }

    #[test]
    fn korean_keywords_match() {
        let doc = "신청 기간은 5월 31일까지입니다. 문의는 120 다산콜센터로 하세요.";
        let rules = FallbackRules::default();
        assert_eq!(
            rules.matching_rule("신청 기간이 언제인가요?", doc).unwrap().name,
            "application"
        );
        let answer = rules.answer("마감 날짜는?", "소비쿠폰", doc);
        assert!(answer.contains("5월 31일"), "{answer}");
    }

    #[test]
    fn rule_is_skipped_when_document_lacks_evidence() {
        let doc = "This page describes the history of the park.";
        let rules = FallbackRules::default();
        assert!(rules.matching_rule("How much is the fee?", doc).is_none());
        let answer = rules.answer("How much is the fee?", "Park", doc);
        assert!(answer.starts_with("According to Park:"));
    }

    #[test]
    fn generic_answer_picks_overlapping_sentence() {
        let doc = "Intro line here. The museum opens at nine. Parking is free.";
        let answer = FallbackRules::new(Vec::new()).answer("Is parking available?", "Museum", doc);
        assert_eq!(answer, "According to Museum: Parking is free.");
    }

    #[test]
    fn empty_document_yields_notice() {
        let answer = FallbackRules::default().answer("anything?", "Empty", "");
        assert!(answer.contains("\"Empty\""));
    }

    #[test]
    fn custom_rule_template() {
        let rule = FallbackRule::new("hours", r"(?i)hours|open", None, "{title} hours: {excerpt}").unwrap();
        let rules = FallbackRules::new(vec![rule]);
        let answer = rules.answer("When does it open?", "Museum", "The museum opens at nine.");
        assert_eq!(answer, "Museum hours: The museum opens at nine.");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(FallbackRule::new("bad", "(", None, "").is_err());
    }
}
