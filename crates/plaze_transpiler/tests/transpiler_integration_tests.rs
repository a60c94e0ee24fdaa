//! Integration tests for the transpiler pipeline and compiled cache.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use plaze_transpiler::{
    hash_path, strip_parentheses, TagKind, TranspileError, Transpiler, TranspilerConfig,
};
use tempfile::tempdir;

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

fn default_transpiler() -> Transpiler {
    Transpiler::new(TranspilerConfig::default()).unwrap()
}

#[test]
fn test_text_without_tags_is_identity() {
    let transpiler = default_transpiler();
    for text in [
        "",
        "plain",
        "<div class=\"x\">a { b } (c) @d</div>\n",
        "email me at someone@example.com\r\n",
    ] {
        assert_eq!(transpiler.transpile_to_string(text).unwrap(), text);
    }
}

#[test]
fn test_echo_families_are_isolated() {
    let transpiler = default_transpiler();

    let raw = transpiler.transpile_to_string("{!! raw !!}").unwrap();
    assert_eq!(raw, "<?php echo raw; ?>");
    assert!(!raw.contains("e("));

    assert_eq!(
        transpiler.transpile_to_string("{{{ val }}}").unwrap(),
        "<?php echo e(val); ?>"
    );
    assert_eq!(
        transpiler.transpile_to_string("{{ val }}").unwrap(),
        "<?php echo e(val); ?>"
    );
}

#[test]
fn test_escape_marker_yields_literal_echo() {
    let output = default_transpiler()
        .transpile_to_string("@{{ val }}")
        .unwrap();
    assert_eq!(output, "{{ val }}");
    assert!(!output.contains("echo"));
}

#[test]
fn test_nested_directive_argument_is_captured_whole() {
    let mut transpiler = default_transpiler();
    transpiler.register_directive("if", |_, arg| {
        assert_eq!(arg, Some("((a || b) && (c))"));
        Ok(format!("<?php if ({}): ?>", strip_parentheses(arg.unwrap_or_default())))
    });

    assert_eq!(
        transpiler
            .transpile_to_string("<@if((a || b) && (c))")
            .unwrap(),
        "<?php if ((a || b) && (c)): ?>"
    );
}

#[test]
fn test_unknown_directive_is_byte_for_byte() {
    let source = "<@madeupdirective(x)";
    assert_eq!(default_transpiler().transpile_to_string(source).unwrap(), source);
}

#[test]
fn test_footer_lines_are_reversed() {
    let mut transpiler = default_transpiler();
    transpiler.register_directive("defer", |ctx, arg| {
        ctx.push_footer(strip_parentheses(arg.unwrap_or_default()));
        Ok(String::new())
    });

    let output = transpiler
        .transpile_to_string("<@defer(\"A\")\n<@defer(\"B\")\n<main>{{ $body }}</main>\n")
        .unwrap();

    assert_eq!(
        output,
        "<main><?php echo e($body); ?></main>\n\n\"B\"\n\"A\""
    );
}

#[test]
fn test_layout_template_end_to_end() {
    let source = "\
<@extends('layouts.app')
{{-- page body --}}
<@foreach($posts as $post)
  <h2>{{ $post->title }}</h2>
  {!! $post->html !!}
<@endforeach
<?php $count = count($posts); // {{ not an echo }} ?>
<p>@{{ literal }}</p>
";
    let output = default_transpiler().transpile_to_string(source).unwrap();

    assert_eq!(
        output,
        "\
<?php foreach($posts as $post): ?>
  <h2><?php echo e($post->title); ?></h2>
  <?php echo $post->html; ?>

<?php endforeach; ?>
<?php $count = count($posts); // {{ not an echo }} ?>
<p>{{ literal }}</p>

<?php echo $__env->make('layouts.app', get_defined_vars())->render(); ?>"
    );
}

#[test]
fn test_near_miss_templates_transpile() {
    let transpiler = default_transpiler();
    let sources = [
        "<@if($a == '{{') x <@endif",
        "<@if($a === '{{{') x <@endif",
        "<@foreach(['{!!', '!!}'] as $m)\n<@endforeach",
        "<@php($open = '{!!')",
        "{{}}",
        "{!!!!}",
        "<p>@{{ '{!!' }}</p>",
        "<p>@{!! '{{' !!}</p>",
        "<@note(Bob's book)",
        "<@media (max-width: 600px",
        "@<@if(($a)",
        "<?php echo '{{'; ?>",
        "{{-- {{ --}}",
    ];

    for source in sources {
        assert!(
            transpiler.transpile_to_string(source).is_ok(),
            "rejected {:?}",
            source
        );
    }
}

#[test]
fn test_unknown_directives_never_fail() {
    let transpiler = default_transpiler();
    for argument in ["(", "(()", "(')", "(\")", "(a, (b", "(it's)"] {
        let source = format!("<@madeup{}", argument);
        assert_eq!(transpiler.transpile_to_string(&source).unwrap(), source);
    }
}

#[test]
fn test_unterminated_echo_is_reported() {
    let err = default_transpiler()
        .transpile_to_string("<p>{{ $name</p>")
        .unwrap_err();
    assert!(matches!(
        err,
        TranspileError::UnterminatedTag {
            tag: TagKind::RegularEcho,
            offset: 3
        }
    ));
    assert!(err.is_template_error());
}

#[test]
fn test_offsets_are_relative_to_template() {
    let err = default_transpiler()
        .transpile_to_string("<?= $a ?>{!! $b")
        .unwrap_err();
    assert!(matches!(
        err,
        TranspileError::UnterminatedTag {
            tag: TagKind::RawEcho,
            offset: 9
        }
    ));
}

#[test]
fn test_transpile_writes_artifact() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("home.plaze.php");
    fs::write(&source, "<h1>{{ $title }}</h1>\n").unwrap();

    let cache_dir = temp.path().join("cache");
    let transpiler =
        Transpiler::new(TranspilerConfig::new().with_cache_dir(&cache_dir)).unwrap();

    let compiled = transpiler.transpile(&source).unwrap().unwrap();
    assert_eq!(
        compiled,
        cache_dir.join(format!("{}.php", hash_path(&source)))
    );
    assert_eq!(
        fs::read_to_string(&compiled).unwrap(),
        "<h1><?php echo e($title); ?></h1>\n"
    );
}

#[test]
fn test_staleness_against_real_files() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("page.plaze.php");
    fs::write(&source, "<p>{{ $a }}</p>").unwrap();

    let transpiler = Transpiler::new(
        TranspilerConfig::new().with_cache_dir(temp.path().join("cache")),
    )
    .unwrap();

    assert!(transpiler.is_stale(&source).unwrap());
    let compiled = transpiler.transpile(&source).unwrap().unwrap();

    let now = SystemTime::now();
    set_mtime(&compiled, now);

    set_mtime(&source, now - Duration::from_secs(120));
    assert!(!transpiler.is_stale(&source).unwrap());

    set_mtime(&source, now);
    assert!(transpiler.is_stale(&source).unwrap());

    set_mtime(&source, now + Duration::from_secs(120));
    assert!(transpiler.is_stale(&source).unwrap());
}

#[test]
fn test_transpile_if_stale_skips_fresh_artifacts() {
    let temp = tempdir().unwrap();
    let source = temp.path().join("page.plaze.php");
    fs::write(&source, "x").unwrap();

    let transpiler = Transpiler::new(
        TranspilerConfig::new().with_cache_dir(temp.path().join("cache")),
    )
    .unwrap();

    assert!(transpiler.transpile_if_stale(&source).unwrap());

    let compiled = transpiler.compiled_path_for(&source).unwrap();
    let now = SystemTime::now();
    set_mtime(&compiled, now);
    set_mtime(&source, now - Duration::from_secs(60));

    assert!(!transpiler.transpile_if_stale(&source).unwrap());
}

#[test]
fn test_missing_source_is_io_error() {
    let temp = tempdir().unwrap();
    let transpiler = Transpiler::new(
        TranspilerConfig::new().with_cache_dir(temp.path().join("cache")),
    )
    .unwrap();

    let err = transpiler
        .transpile(&temp.path().join("missing.plaze.php"))
        .unwrap_err();
    assert!(matches!(err, TranspileError::Io(_)));
}

#[test]
fn test_compiled_paths_are_deterministic() {
    let transpiler =
        Transpiler::new(TranspilerConfig::new().with_cache_dir("/tmp/plaze")).unwrap();

    let a = Path::new("views/a.plaze.php");
    let b = Path::new("views/b.plaze.php");
    assert_eq!(transpiler.compiled_path_for(a), transpiler.compiled_path_for(a));
    assert_ne!(transpiler.compiled_path_for(a), transpiler.compiled_path_for(b));
}

#[test]
fn test_shared_transpiler_across_threads() {
    let mut transpiler = default_transpiler();
    transpiler.register_directive("mark", |ctx, arg| {
        ctx.push_footer(strip_parentheses(arg.unwrap_or_default()));
        Ok(String::new())
    });
    let transpiler = Arc::new(transpiler);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let transpiler = Arc::clone(&transpiler);
            thread::spawn(move || {
                transpiler
                    .transpile_to_string(&format!("<@mark({i})\nbody"))
                    .unwrap()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), format!("body\n{i}"));
    }
}
