//! Testing utilities and mock implementations.
//!
//! This module provides a scripted HTTP transport and canned site pages,
//! allowing adapters and the server to be tested without a real tracker.
//!
//! # Example
//!
//! ```rust,ignore
//! use indexer_core::testing::{fixtures, MockTransport};
//!
//! let transport = MockTransport::new();
//! transport.push_login_flow().await;
//! transport.push_ok(fixtures::NORBITS_RESULTS_PAGE).await;
//! ```

mod mock_transport;

pub use mock_transport::{MockTransport, RecordedRequest};

/// Canned NorBits pages and helpers to build more.
pub mod fixtures {
    use crate::indexer::{NorBitsSettings, DEFAULT_NORBITS_URL};

    /// Settings with dummy credentials against the public base URL.
    pub fn norbits_settings() -> NorBitsSettings {
        NorBitsSettings {
            base_url: DEFAULT_NORBITS_URL.to_string(),
            username: "alice".to_string(),
            password: "hunter2".to_string(),
            two_factor_auth_code: None,
            use_full_search: false,
            free_leech_only: false,
        }
    }

    /// Page served to a logged-in user.
    pub const NORBITS_HOME_PAGE: &str = r#"<html><body>
<div id="userbar">Velkommen alice! <a href="logout.php">Logg ut</a></div>
</body></html>"#;

    /// Page served when the session is missing or expired.
    pub const NORBITS_LOGIN_PAGE: &str = r#"<html><body>
<form method="post" action="takelogin.php">
<input type="text" name="username"><input type="password" name="password">
</form>
</body></html>"#;

    /// Results page with four rows:
    /// freeleech movie with genres and IMDb link, halfleech TV episode,
    /// 90% discounted audiobook with a broken IMDb link, and a bare row
    /// with no links and an unknown category.
    pub const NORBITS_RESULTS_PAGE: &str = r#"<html><body>
<div id="userbar"><a href="logout.php">Logg ut</a></div>
<table id="torrentTable">
<tr><td>Type</td><td>Navn</td><td>Filer</td><td>Kom.</td><td>Lagt til</td><td>TTL</td><td>Størrelse</td><td>Fullført</td><td>Seedere</td><td>Leechere</td></tr>
<tr>
<td><a href="/browse.php?main_cat[]=1&amp;sub2_cat[]=19"><img src="pic/cat_film.png" alt="Filmer"></a></td>
<td><a href="/details.php?id=1001&amp;hit=1" title=" The.Matrix.1999.1080p.BluRay.x264-NB ">The.Matrix.1999.1080p...</a>
<img src="pic/fl.png" title="100% freeleech">
<a href="/download.php?id=1001&amp;passkey=abc"><img src="pic/dl.png"></a><br>
<span class="genres">(Action&nbsp;| Sci-Fi)</span>
<a href="https://www.imdb.com/title/tt0133093/" target="_blank">IMDb</a></td>
<td><a href="/filelist.php?id=1001">3</a></td>
<td>12</td>
<td>2024-01-15<br>12:34:56</td>
<td>2 dager</td>
<td>8.74 GB</td>
<td>1,234<br>ganger</td>
<td>56</td>
<td>7</td>
</tr>
<tr>
<td><a href="/browse.php?main_cat[]=2"><img src="pic/cat_tv.png" alt="TV"></a></td>
<td><a href="/details.php?id=1002" title="Lykkeland.S03E01.NORWEGIAN.1080p.WEB.h264-NB">Lykkeland.S03E01</a>
<img src="pic/half.png" title="Halfleech">
<a href="/download.php?id=1002&amp;passkey=abc"><img src="pic/dl.png"></a></td>
<td><a href="/filelist.php?id=1002">12</a></td>
<td>0</td>
<td>2024-02-01<br>08:00:00</td>
<td>1 time</td>
<td>1.5 GB</td>
<td>99<br>ganger</td>
<td>10</td>
<td>3</td>
</tr>
<tr>
<td><a href="/browse.php?sub2_cat[]=3&amp;main_cat[]=7"><img src="pic/cat_lyd.png" alt="Lydbøker"></a></td>
<td><a href="/details.php?id=1003" title="Jo.Nesbo-Flaggermusmannen-NORWEGIAN-AUDIOBOOK">Flaggermusmannen</a>
<img src="pic/90.png" title="90% Freeleech">
<a href="/download.php?id=1003&amp;passkey=abc"><img src="pic/dl.png"></a>
<a href="https://www.imdb.com/title/ttabc/">IMDb</a></td>
<td><a href="/filelist.php?id=1003">24</a></td>
<td>1</td>
<td>2023-12-24<br>18:00:00</td>
<td>3 uker</td>
<td>350 MB</td>
<td>0<br>ganger</td>
<td>0</td>
<td>0</td>
</tr>
<tr>
<td><a href="/browse.php?main_cat[]=99"><img src="pic/cat_ukjent.png"></a></td>
<td>Slettet torrent</td>
<td></td>
<td></td>
<td>2023-11-01<br>00:00:00</td>
<td></td>
<td>-</td>
<td></td>
<td></td>
<td></td>
</tr>
</table>
</body></html>"#;

    /// Results page whose only row has an unreadable date.
    pub const NORBITS_BAD_DATE_PAGE: &str = r#"<html><body>
<a href="logout.php">Logg ut</a>
<table id="torrentTable">
<tr><td>Type</td><td>Navn</td><td>Filer</td><td>Kom.</td><td>Lagt til</td><td>TTL</td><td>Størrelse</td><td>Fullført</td><td>Seedere</td><td>Leechere</td></tr>
<tr>
<td><a href="/browse.php?main_cat[]=1"></a></td>
<td><a href="/details.php?id=1" title="Broken">Broken</a></td>
<td><a href="/filelist.php?id=1">1</a></td>
<td>0</td>
<td>i går kl. 12</td>
<td></td>
<td>1 GB</td>
<td>0</td>
<td>1</td>
<td>1</td>
</tr>
</table>
</body></html>"#;

    /// A single movie row carrying the given badge markup.
    pub fn norbits_row(badges: &str) -> String {
        format!(
            r#"<tr>
<td><a href="/browse.php?main_cat[]=1"></a></td>
<td><a href="/details.php?id=2000" title="Some.Movie.2020.720p-NB">Some.Movie</a>
{badges}
<a href="/download.php?id=2000&amp;passkey=abc"></a></td>
<td><a href="/filelist.php?id=2000">1</a></td>
<td>0</td>
<td>2024-05-01<br>10:00:00</td>
<td></td>
<td>700 MB</td>
<td>4<br>ganger</td>
<td>5</td>
<td>2</td>
</tr>"#
        )
    }

    /// Wrap rows in a logged-in results page with a header row.
    pub fn norbits_page(rows: &[String]) -> String {
        format!(
            r#"<html><body>
<a href="logout.php">Logg ut</a>
<table id="torrentTable">
<tr><td>Type</td><td>Navn</td><td>Filer</td><td>Kom.</td><td>Lagt til</td><td>TTL</td><td>Størrelse</td><td>Fullført</td><td>Seedere</td><td>Leechere</td></tr>
{}
</table>
</body></html>"#,
            rows.join("\n")
        )
    }
}
