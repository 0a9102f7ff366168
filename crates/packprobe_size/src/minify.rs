use log::debug;
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc_parser::Parser as OxcParser;
use oxc_span::SourceType;

use packprobe_core::ProbeError;

/// Minify concatenated bundle text with mangling and dead-code compression
/// enabled. Errors here are recoverable: the caller measures the raw text
/// instead.
pub fn minify(source: &str) -> Result<String, ProbeError> {
    let allocator = Allocator::default();
    let st = SourceType::default().with_module(true);
    let ret = OxcParser::new(&allocator, source, st).parse();
    if ret.panicked {
        return Err(ProbeError::MinifyFailed("bundle text did not parse".to_string()));
    }

    let mut program = ret.program;
    let options = MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::default()),
    };
    let minified = Minifier::new(options).minify(&allocator, &mut program);

    let output = Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(minified.scoping)
        .build(&program);
    debug!("Minified {} bytes down to {}", source.len(), output.code.len());
    Ok(output.code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minify_shrinks_whitespace() {
        let source = "const answer   =   40 + 2;\n\nexport { answer };\n";
        let minified = minify(source).unwrap();
        assert!(minified.len() < source.len());
        assert!(!minified.contains("   "));
    }

    #[test]
    fn test_minify_rejects_garbage() {
        assert!(minify("this is not (((( javascript").is_err());
    }
}
