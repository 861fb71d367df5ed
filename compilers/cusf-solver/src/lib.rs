pub mod agreement;
pub mod check;
pub mod fill;
pub mod graph;

pub use agreement::{compare, count_matches, pred_edges, AgreementReport, EdgeMap};
pub use check::{
    check_document, check_frame, check_sentence, CheckReport, Diagnostic, FrameStatus, Warning,
};
pub use fill::{fill_document, fill_sentence, FillStats};
pub use graph::FrameGraph;

#[cfg(test)]
mod tests {
    use super::*;
    use cusf_parser::read_str;

    #[test]
    fn test_fill_then_check() {
        // A fresh conversion: every predicate gets a frame, none annotated.
        let mut doc = read_str(
            "\
1\tKim\t_\t_\t_\t_\t2\tnsubj\t_\t_
2\tloves\t_\t_\t_\t_\t0\troot\t_\t_
3\tSandy\t_\t_\t_\t_\t2\tobj\t_\t_

",
        );
        fill_document(&mut doc);
        let reread = read_str(&doc.render());
        let report = check_document(&reread);
        assert_eq!(report.predicates, 3);
        assert_eq!(report.annotated, 0);
        assert!(report.warnings.is_empty());
    }
}
