use super::parser::Expr;
use crate::{InvertedIndex, PostingSet};

/// Evaluate an AST against the index. Unknown terms are the empty set; the
/// index is only read.
///
/// Chains are folded left to right in a loop; recursion only follows
/// parentheses and `not`.
pub fn evaluate(expr: &Expr, index: &InvertedIndex) -> PostingSet {
    match expr {
        Expr::Term(t) => index.postings(t).cloned().unwrap_or_default(),
        Expr::And(operands) => {
            let mut operands = operands.iter();
            let Some(first) = operands.next() else { return PostingSet::new() };
            let mut acc = evaluate(first, index);
            for x in operands {
                if acc.is_empty() {
                    break;
                }
                let next = evaluate(x, index);
                acc.retain(|d| next.contains(d));
            }
            acc
        }
        Expr::Or(operands) => {
            let mut acc = PostingSet::new();
            for x in operands {
                acc.extend(evaluate(x, index));
            }
            acc
        }
        Expr::Not(x) => {
            let excluded = evaluate(x, index);
            index.documents.difference(&excluded).cloned().collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocId;

    fn ids(set: &PostingSet) -> Vec<&str> {
        set.iter().map(DocId::as_str).collect()
    }

    #[test]
    fn not_of_unknown_term_is_everything() {
        let idx = InvertedIndex::from_documents(vec![(DocId::from(1), vec!["cat"]), (DocId::from(2), vec![])]);
        let all = evaluate(&Expr::Not(Box::new(Expr::Term("owl".into()))), &idx);
        assert_eq!(ids(&all), vec!["1", "2"]);
    }

    #[test]
    fn and_short_circuits_on_empty_left() {
        let idx = InvertedIndex::from_documents(vec![(DocId::from(1), vec!["cat"])]);
        let expr = Expr::And(vec![Expr::Term("owl".into()), Expr::Term("cat".into())]);
        assert!(evaluate(&expr, &idx).is_empty());
    }

    #[test]
    fn chains_fold_left_to_right() {
        let idx = InvertedIndex::from_documents(vec![
            (DocId::from(1), vec!["cat", "dog"]),
            (DocId::from(2), vec!["dog", "owl"]),
            (DocId::from(10), vec!["dog", "cat", "owl"]),
        ]);
        let term = |t: &str| Expr::Term(t.into());
        let all = Expr::And(vec![term("dog"), term("cat"), term("owl")]);
        assert_eq!(ids(&evaluate(&all, &idx)), vec!["10"]);
        let any = Expr::Or(vec![term("fox"), term("owl"), term("cat")]);
        assert_eq!(ids(&evaluate(&any, &idx)), vec!["1", "2", "10"]);
    }
}
