pub mod conllu;
pub mod document;
pub mod frame;

pub use conllu::{ConlluBlock, ConlluError, ConlluLine};
pub use document::{
    add_sentence_ids, number_sentence, read, read_str, Document, DocumentError, FrameEntry,
    Sentence,
};
pub use frame::{parse_argument, parse_frame, FrameParseError};

#[cfg(test)]
mod tests {
    use super::*;
    use cusf_protocol::TokenRef;

    #[test]
    fn test_read_from_reader() {
        let text = "1\tKim\t_\t_\t_\t_\t0\troot\t_\t_\n\n[STATE] Kim (1)\n";
        let doc = read(text.as_bytes()).unwrap();
        assert_eq!(doc.sentences.len(), 1);

        let frame = doc.sentences[0].frames().next().unwrap();
        assert_eq!(frame.head, TokenRef::from("1"));
        assert_eq!(frame.label, "STATE");
        // A missing final empty line is added back on output.
        assert_eq!(doc.render(), format!("{text}\n"));
    }
}
