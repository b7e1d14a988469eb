use crate::CliError;
use distplot::Point;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;

/// Divergence scores keyed by `(left, right)`, i.e. `D(left | right)`.
pub(crate) type Divergences = BTreeMap<(String, String), f64>;

pub(crate) fn read_divergences(path: &str) -> Result<Divergences, CliError> {
    let file = std::fs::File::open(path)?;
    parse_divergences(file)
}

/// Rows are `left,right,distance` without a header. Later rows overwrite earlier duplicates.
pub(crate) fn parse_divergences<R: Read>(reader: R) -> Result<Divergences, CliError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut out = Divergences::new();
    for (line, record) in csv.records().enumerate() {
        let record = record?;
        if record.len() != 3 {
            return Err(CliError::Input(format!(
                "line {}: input file must have 3 columns, found {}",
                line + 1,
                record.len()
            )));
        }
        let raw = &record[2];
        let value = raw.trim().parse::<f64>().map_err(|_| {
            CliError::Input(format!("line {}: invalid KL-divergence: {raw}", line + 1))
        })?;
        out.insert((record[0].to_string(), record[1].to_string()), value);
    }
    Ok(out)
}

/// One point per distinct name, in sorted name order.
pub(crate) fn build_points(divergences: &Divergences) -> (Vec<Point>, Vec<String>) {
    let names = divergences
        .keys()
        .flat_map(|(l, r)| [l.as_str(), r.as_str()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let index = names
        .iter()
        .enumerate()
        .map(|(i, n)| (n.as_str(), i))
        .collect::<BTreeMap<_, _>>();

    let mut points = vec![Point::new(); names.len()];
    for ((left, right), &value) in divergences {
        points[index[left.as_str()]].set_distance(index[right.as_str()], value);
    }
    (points, names)
}
