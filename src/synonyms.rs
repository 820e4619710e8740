use std::collections::BTreeSet;

/// Canonical statistics terms and the aliases students use for them.
pub const SYNONYMS: &[(&str, &[&str])] = &[
    ("ค่าเฉลี่ย", &["mean", "average", "ค่ากลาง", "ค่าเฉลี่ยเลขคณิต"]),
    ("มัธยฐาน", &["median", "ค่ากลาง"]),
    ("ฐานนิยม", &["mode", "โหมด"]),
    ("ส่วนเบี่ยงเบนมาตรฐาน", &["standard deviation", "SD", "ความแปรปรวน"]),
    ("ความแปรปรวน", &["variance", "var"]),
    ("พิสัย", &["range", "ค่าพิสัย"]),
    ("ควอไทล์", &["quartile", "Q1", "Q2", "Q3"]),
    ("เปอร์เซ็นไทล์", &["percentile"]),
    ("การแจกแจงความถี่", &["frequency distribution", "ตารางแจกแจงความถี่"]),
    ("ฮิสโตแกรม", &["histogram", "กราฟแท่ง"]),
    ("กราฟ", &["chart", "graph", "แผนภูมิ"]),
    ("ความน่าจะเป็น", &["probability", "โอกาส"]),
    ("การสุ่มตัวอย่าง", &["sampling", "ตัวอย่าง"]),
    ("ประชากร", &["population"]),
    ("การทดสอบสมมติฐาน", &["hypothesis testing", "การทดสอบ"]),
    ("ค่า Z", &["Z-score", "คะแนนมาตรฐาน"]),
    ("ค่า T", &["T-score", "t-test"]),
    ("สหสัมพันธ์", &["correlation", "ความสัมพันธ์"]),
    ("การถดถอย", &["regression", "เส้นถดถอย"]),
    ("ข้อมูลเชิงปริมาณ", &["quantitative data", "ข้อมูลตัวเลข"]),
    ("ข้อมูลเชิงคุณภาพ", &["qualitative data", "ข้อมูลเชิงกลุ่ม"]),
    ("ตัวแปรต่อเนื่อง", &["continuous variable"]),
    ("ตัวแปรไม่ต่อเนื่อง", &["discrete variable"]),
];

/// Collect every term related to something mentioned in `text`.
///
/// A canonical term in the text pulls in all of its aliases; an alias pulls in
/// its canonical term and its sibling aliases. Matching is a case-insensitive
/// substring test. The result is de-duplicated and sorted.
pub fn expand_synonyms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut expanded = BTreeSet::new();

    for (key, aliases) in SYNONYMS {
        if lower.contains(&key.to_lowercase()) {
            expanded.extend(aliases.iter().map(|a| a.to_string()));
        }
        for alias in aliases.iter() {
            if lower.contains(&alias.to_lowercase()) {
                expanded.insert(key.to_string());
                expanded.extend(
                    aliases
                        .iter()
                        .filter(|other| *other != alias)
                        .map(|other| other.to_string()),
                );
            }
        }
    }

    expanded.into_iter().collect()
}

/// Hint appended to the user's question, or an empty string when nothing matched.
pub fn synonym_hint(text: &str) -> String {
    let terms = expand_synonyms(text);
    if terms.is_empty() {
        String::new()
    } else {
        format!(" (คำที่เกี่ยวข้อง: {})", terms.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_pulls_in_aliases() {
        let terms = expand_synonyms("พิสัยคืออะไร");
        assert!(terms.contains(&"range".to_string()));
        assert!(terms.contains(&"ค่าพิสัย".to_string()));
    }

    #[test]
    fn test_alias_is_symmetric() {
        let terms = expand_synonyms("What is the MEDIAN?");
        assert!(terms.contains(&"มัธยฐาน".to_string()));
        // "ค่ากลาง" is a sibling alias of "median"
        assert!(terms.contains(&"ค่ากลาง".to_string()));
        assert!(!terms.contains(&"median".to_string()));
    }

    #[test]
    fn test_case_insensitive_alias() {
        let terms = expand_synonyms("how do I compute the sd");
        assert!(terms.contains(&"ส่วนเบี่ยงเบนมาตรฐาน".to_string()));
        assert!(terms.contains(&"standard deviation".to_string()));
    }

    #[test]
    fn test_result_sorted_and_deduplicated() {
        // "ค่ากลาง" is reachable from both mean and median
        let terms = expand_synonyms("mean and median");
        let mut sorted = terms.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(terms, sorted);
        assert_eq!(terms.iter().filter(|t| *t == "ค่ากลาง").count(), 1);
    }

    #[test]
    fn test_deterministic() {
        let q = "ความน่าจะเป็นกับ regression";
        assert_eq!(expand_synonyms(q), expand_synonyms(q));
    }

    #[test]
    fn test_no_match() {
        assert!(expand_synonyms("ตารางสอบวันไหน").is_empty());
        assert_eq!(synonym_hint("ตารางสอบวันไหน"), "");
    }

    #[test]
    fn test_hint_format() {
        assert_eq!(
            synonym_hint("percentile"),
            " (คำที่เกี่ยวข้อง: เปอร์เซ็นไทล์)"
        );
    }
}
