use libtest_mimic::{Arguments, Failed, Trial};

use fpconv_test::{check_file, vector_files};

fn main() {
    let args = Arguments::from_args();

    let tests = vector_files()
        .into_iter()
        .map(|(name, contents)| {
            Trial::test(name, move || {
                check_file(name, contents).map_err(|err| Failed::from(format!("{err:#}")))
            })
        })
        .collect();

    libtest_mimic::run(&args, tests).exit();
}
